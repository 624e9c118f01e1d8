//! Numeric input validation
//!
//! A numeric field is optional from this validator's point of view: empty is
//! always valid, anything else must start with a non-negative number.

use loandesk_core::dom::{Dom, Selector};
use loandesk_core::numeric::parse_float_prefix;

use crate::field::{FieldError, FieldState, clear_error};

/// Selector for every field this validator attaches to
pub fn numeric_inputs() -> Selector {
	Selector::tag("input").with_attr_eq("type", "number")
}

/// Validates raw field text
///
/// # Examples
///
/// ```
/// use loandesk_forms::field::{FieldError, FieldState};
/// use loandesk_forms::numeric_input::validate_numeric;
///
/// assert_eq!(validate_numeric("  "), FieldState::Clean);
/// assert_eq!(validate_numeric("12.5"), FieldState::Clean);
/// assert_eq!(validate_numeric("abc"), FieldState::Invalid(FieldError::InvalidNumber));
/// assert_eq!(validate_numeric("-5"), FieldState::Invalid(FieldError::NegativeNumber));
/// ```
pub fn validate_numeric(value: &str) -> FieldState {
	let value = value.trim();
	if value.is_empty() {
		return FieldState::Clean;
	}
	match parse_float_prefix(value) {
		None => FieldState::Invalid(FieldError::InvalidNumber),
		Some(n) if n < 0.0 => FieldState::Invalid(FieldError::NegativeNumber),
		Some(_) => FieldState::Clean,
	}
}

/// Validates `field` in place and renders the outcome
///
/// Runs on blur and for every numeric field on submit.
pub fn validate_field<D: Dom + ?Sized>(dom: &mut D, field: &D::Node) -> FieldState {
	let state = validate_numeric(&dom.value(field));
	state.render(dom, field);
	state
}

/// Input handler: typing always clears a pending error
pub fn on_input<D: Dom + ?Sized>(dom: &mut D, field: &D::Node) {
	clear_error(dom, field);
}
