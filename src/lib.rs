//! # Loandesk
//!
//! Client-side behaviour for the loan management pages: safe number
//! handling, field validation, duplicate-submission protection, derived
//! balance fields, data grid and searchable select lifecycles, and the
//! one-time page bootstrap that wires them together.
//!
//! Built for `wasm32-unknown-unknown`, where the `pages` feature installs the
//! runtime on module start and exports `LoanApp` / `SearchableDropdown` to
//! other page scripts. On native targets the same runtime runs against the
//! in-memory document, which is how it is tested.
//!
//! ## Feature Flags
//!
//! - `pages` (default) - page runtime, implies `forms` and `widgets`
//! - `forms` - validators, submission guard, derived fields
//! - `widgets` - grid and searchable select lifecycle management
//! - `console_error_panic_hook` - readable panics in the browser console
//! - `debug-logs` - `debug_log!` output in release builds
//! - `testing` - scripted host and fake widget libraries
//!
//! ## Example
//!
//! ```
//! use loandesk::prelude::*;
//!
//! assert_eq!(format_currency(250000), "₹250,000.00");
//! assert_eq!(safe_number("12abc", 0.0), 12.0);
//! ```

pub mod core;
#[cfg(feature = "forms")]
pub mod forms;
#[cfg(feature = "pages")]
pub mod pages;
#[cfg(feature = "widgets")]
pub mod widgets;

pub use loandesk_core::{NumberFormat, RawValue, format_currency, format_percentage, safe_number};

#[cfg(feature = "forms")]
pub use loandesk_forms::{DerivedFieldUpdater, FieldError, FieldState, SubmissionGuard};

#[cfg(feature = "widgets")]
pub use loandesk_widgets::{WidgetError, WidgetLifecycleManager};

#[cfg(feature = "pages")]
pub use loandesk_pages::{BootstrapReport, Host, PageRuntime, Settings, SettingsError};

/// Commonly used items
pub mod prelude {
	pub use loandesk_core::dates::calculate_days;
	pub use loandesk_core::{Dom, NumberFormat, RawValue, format_currency, format_percentage, safe_number};

	#[cfg(feature = "forms")]
	pub use loandesk_forms::{FieldError, FieldState};

	#[cfg(feature = "widgets")]
	pub use loandesk_widgets::{GridLibrary, InitOutcome, SelectLibrary};

	#[cfg(feature = "pages")]
	pub use loandesk_pages::{Dispatch, EventType, Host, PageEvent, PageRuntime, Settings};
}
