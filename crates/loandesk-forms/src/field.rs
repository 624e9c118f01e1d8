//! Field validation state and its rendering

use loandesk_core::dom::Dom;
use loandesk_core::patch::{DomPatch, apply_patches};

/// Marker class of an invalid field
pub const INVALID_CLASS: &str = "is-invalid";

/// Why a field is invalid
///
/// The `Display` text is the message rendered next to the field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FieldError {
	#[error("Please enter a valid number")]
	InvalidNumber,

	#[error("Please enter a positive number")]
	NegativeNumber,

	#[error("Please enter a valid date")]
	InvalidDate,

	#[error("End date must be after start date")]
	RangeInverted,

	/// A far-future date the user declined to confirm; never rendered
	#[error("The selected date was not confirmed")]
	DateNotConfirmed,
}

/// Validation state of a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState {
	Clean,
	Invalid(FieldError),
}

impl FieldState {
	pub fn is_valid(&self) -> bool {
		matches!(self, Self::Clean)
	}

	pub fn error(&self) -> Option<&FieldError> {
		match self {
			Self::Clean => None,
			Self::Invalid(error) => Some(error),
		}
	}

	/// Patches that make the field's marker class and feedback node agree
	/// with this state
	pub fn patches(&self) -> Vec<DomPatch> {
		match self {
			Self::Clean => clear_patches(),
			Self::Invalid(error) => vec![
				DomPatch::add_class(INVALID_CLASS),
				DomPatch::ShowFeedback(error.to_string()),
			],
		}
	}

	/// Renders this state onto `field`
	pub fn render<D: Dom + ?Sized>(&self, dom: &mut D, field: &D::Node) {
		apply_patches(dom, field, &self.patches());
	}
}

/// Patches removing any error state from a field
pub fn clear_patches() -> Vec<DomPatch> {
	vec![DomPatch::remove_class(INVALID_CLASS), DomPatch::ClearFeedback]
}

/// Removes any error state from `field`
pub fn clear_error<D: Dom + ?Sized>(dom: &mut D, field: &D::Node) {
	apply_patches(dom, field, &clear_patches());
}

#[cfg(test)]
mod tests {
	use super::*;
	use loandesk_core::dom::{MemoryDom, Selector, el};
	use loandesk_core::patch::FEEDBACK_CLASS;
	use rstest::rstest;

	#[rstest]
	#[case(FieldError::InvalidNumber, "Please enter a valid number")]
	#[case(FieldError::NegativeNumber, "Please enter a positive number")]
	#[case(FieldError::InvalidDate, "Please enter a valid date")]
	#[case(FieldError::RangeInverted, "End date must be after start date")]
	fn test_messages(#[case] error: FieldError, #[case] message: &str) {
		assert_eq!(error.to_string(), message);
	}

	#[rstest]
	fn test_class_and_feedback_agree() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let group = dom.append(body, el("div").child(el("input").id("f")));
		let field = dom.get_element_by_id("f").unwrap();
		let feedback = Selector::class(FEEDBACK_CLASS);

		FieldState::Invalid(FieldError::InvalidNumber).render(&mut dom, &field);
		assert!(dom.has_class(&field, INVALID_CLASS));
		assert_eq!(dom.query_selector_all(&group, &feedback).len(), 1);

		FieldState::Clean.render(&mut dom, &field);
		assert!(!dom.has_class(&field, INVALID_CLASS));
		assert!(dom.query_selector_all(&group, &feedback).is_empty());
	}
}
