//! Loandesk Forms - field validation and form behaviour
//!
//! Validators are pure functions from field text to [`FieldState`]; rendering a
//! state is a list of [`DomPatch`](loandesk_core::patch::DomPatch)es applied to
//! the field. The same split is used by the submission guard and the derived
//! field updater.
//!
//! ## Modules
//!
//! - [`field`]: field state, error messages, rendering
//! - [`numeric_input`]: numeric field validation
//! - [`date_input`]: date field validation with far-future confirmation
//! - [`submission`]: duplicate-submission guard
//! - [`derived`]: running balance and period recomputation

pub mod date_input;
pub mod derived;
pub mod field;
pub mod numeric_input;
pub mod submission;

pub use date_input::{DateCheck, FUTURE_DATE_PROMPT, check_date, validate_date_field};
pub use derived::{BalanceIndicator, BalanceUpdate, DerivedFieldUpdater, PeriodOutcome, RangeCheck};
pub use field::{FieldError, FieldState, INVALID_CLASS};
pub use numeric_input::validate_numeric;
pub use submission::{
	BUSY_LABEL, BlockReason, LOADING_CLASS, SubmissionGuard, SubmissionTicket, SubmitDecision,
};
