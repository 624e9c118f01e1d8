//! Loandesk Core - shared building blocks for the loan desk front end
//!
//! ## Modules
//!
//! - [`numeric`]: total number parsing plus currency and percentage formatting
//! - [`dates`]: date-input parsing and elapsed-day computation
//! - [`dom`]: the [`Dom`](dom::Dom) abstraction, selectors and the in-memory document
//! - [`patch`]: DOM patch instructions and their adapter
//! - [`timers`]: virtual timer queue for deferred work
//! - [`logging`]: console/tracing logging macros
//!
//! ## Example
//!
//! ```
//! use loandesk_core::numeric::{format_currency, format_percentage, safe_number};
//!
//! assert_eq!(format_currency(1234.5), "₹1,234.50");
//! assert_eq!(format_currency(""), "₹0.00");
//! assert_eq!(format_percentage(7), "7.00%");
//! assert_eq!(safe_number("abc", 3.0), 3.0);
//! ```

pub mod dates;
pub mod dom;
pub mod logging;
pub mod numeric;
pub mod patch;
pub mod timers;

pub use dom::{Dom, DomError, MemoryDom, NodeId, Selector, SelectorError, el};
pub use numeric::{NumberFormat, RawValue, format_currency, format_percentage, safe_number};
pub use patch::{DomPatch, apply_patches};
pub use timers::{TimerId, TimerQueue};
