//! Date input validation
//!
//! Unreadable dates are invalid. Dates more than a year ahead are readable
//! but suspicious, so the user is asked to confirm them.

use chrono::NaiveDate;
use loandesk_core::dates::{is_beyond_one_year, parse_date};
use loandesk_core::dom::{Dom, Selector};
use loandesk_core::patch::{DomPatch, apply_patches};

use crate::field::{FieldError, FieldState, clear_error};

/// Prompt shown before accepting a far-future date
pub const FUTURE_DATE_PROMPT: &str =
	"The selected date is more than a year in the future. Are you sure this is correct?";

pub fn date_inputs() -> Selector {
	Selector::tag("input").with_attr_eq("type", "date")
}

/// Result of checking date text against a calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateCheck {
	/// Empty or acceptable
	Clean,
	Invalid(FieldError),
	/// Readable but more than a year after `today`
	NeedsConfirmation,
}

/// Classifies date text without touching the document
pub fn check_date(value: &str, today: NaiveDate) -> DateCheck {
	if value.trim().is_empty() {
		return DateCheck::Clean;
	}
	match parse_date(value) {
		None => DateCheck::Invalid(FieldError::InvalidDate),
		Some(date) if is_beyond_one_year(date, today) => DateCheck::NeedsConfirmation,
		Some(_) => DateCheck::Clean,
	}
}

/// Validates a date field, asking `confirm` about far-future dates
///
/// An empty field is left untouched. Declining the confirmation moves focus
/// back to the field and keeps whatever error it already shows.
pub fn validate_date_field<D, F>(
	dom: &mut D,
	field: &D::Node,
	today: NaiveDate,
	confirm: F,
) -> FieldState
where
	D: Dom + ?Sized,
	F: FnOnce(&str) -> bool,
{
	let value = dom.value(field);
	if value.is_empty() {
		return FieldState::Clean;
	}
	match check_date(&value, today) {
		DateCheck::Invalid(error) => {
			let state = FieldState::Invalid(error);
			state.render(dom, field);
			state
		}
		DateCheck::NeedsConfirmation if !confirm(FUTURE_DATE_PROMPT) => {
			apply_patches(dom, field, &[DomPatch::Focus]);
			FieldState::Invalid(FieldError::DateNotConfirmed)
		}
		DateCheck::NeedsConfirmation | DateCheck::Clean => {
			clear_error(dom, field);
			FieldState::Clean
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::field::INVALID_CLASS;
	use loandesk_core::dom::{MemoryDom, NodeId, el};
	use rstest::{fixture, rstest};

	fn today() -> NaiveDate {
		NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
	}

	#[fixture]
	fn date_field() -> (MemoryDom, NodeId) {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		dom.append(
			body,
			el("div").child(el("input").id("period_to").attr("type", "date")),
		);
		let field = dom.get_element_by_id("period_to").unwrap();
		(dom, field)
	}

	#[rstest]
	#[case("", DateCheck::Clean)]
	#[case("2026-01-01", DateCheck::Clean)]
	#[case("2027-10-16", DateCheck::Clean)]
	#[case("2027-10-17", DateCheck::NeedsConfirmation)]
	#[case("not a date", DateCheck::Invalid(FieldError::InvalidDate))]
	fn test_check_date(#[case] value: &str, #[case] expected: DateCheck) {
		assert_eq!(check_date(value, today()), expected);
	}

	#[rstest]
	fn test_invalid_date_renders_error(date_field: (MemoryDom, NodeId)) {
		let (mut dom, field) = date_field;
		dom.set_value(&field, "2026-02-31");
		let state = validate_date_field(&mut dom, &field, today(), |_| true);
		assert_eq!(state, FieldState::Invalid(FieldError::InvalidDate));
		assert!(dom.has_class(&field, INVALID_CLASS));
	}

	#[rstest]
	fn test_declined_confirmation_keeps_error_and_focus(date_field: (MemoryDom, NodeId)) {
		let (mut dom, field) = date_field;
		dom.set_value(&field, "garbage");
		validate_date_field(&mut dom, &field, today(), |_| true);

		dom.set_value(&field, "2030-01-01");
		let mut asked = None;
		let state = validate_date_field(&mut dom, &field, today(), |prompt| {
			asked = Some(prompt.to_string());
			false
		});
		assert!(!state.is_valid());
		assert_eq!(asked.as_deref(), Some(FUTURE_DATE_PROMPT));
		assert_eq!(dom.active_element(), Some(field));
		assert!(dom.has_class(&field, INVALID_CLASS));
	}

	#[rstest]
	fn test_accepted_confirmation_clears(date_field: (MemoryDom, NodeId)) {
		let (mut dom, field) = date_field;
		dom.set_value(&field, "garbage");
		validate_date_field(&mut dom, &field, today(), |_| true);

		dom.set_value(&field, "2030-01-01");
		let state = validate_date_field(&mut dom, &field, today(), |_| true);
		assert!(state.is_valid());
		assert!(!dom.has_class(&field, INVALID_CLASS));
	}
}
