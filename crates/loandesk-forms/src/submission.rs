//! Duplicate-submission guard
//!
//! The Submitting flag lives on the form itself as the [`LOADING_CLASS`]
//! marker, so the guard holds no per-form memory. Each submission is stamped
//! with a generation number stored on the form; a reset carrying an older
//! generation is ignored, which lets a fallback timer from a previous
//! submission fire harmlessly.

use loandesk_core::dom::{Dom, Selector};
use loandesk_core::patch::{DomPatch, apply_patches};
use loandesk_core::{debug_log, info_log};

use crate::numeric_input::{numeric_inputs, validate_field};

/// Marker class of a form in the Submitting state
pub const LOADING_CLASS: &str = "form-loading";

/// Label shown on the submit control while submitting
pub const BUSY_LABEL: &str = "<span class=\"loading-spinner\"></span> Processing...";

const ORIGINAL_LABEL_KEY: &str = "loandeskOriginalLabel";
const GENERATION_KEY: &str = "loandeskSubmitGeneration";

/// Identifies one accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
	pub generation: u64,
}

/// Why a submit event was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
	AlreadySubmitting,
	/// Number of numeric fields that failed validation
	InvalidFields(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDecision {
	/// Let the event proceed; the form is now Submitting
	Proceed(SubmissionTicket),
	/// Cancel the event
	Blocked(BlockReason),
}

impl SubmitDecision {
	pub fn is_blocked(&self) -> bool {
		matches!(self, Self::Blocked(_))
	}
}

/// Selector of the control relabelled while submitting
pub fn submit_button() -> Selector {
	Selector::tag("button").with_attr_eq("type", "submit")
}

/// Patches entering the Submitting state, as (form, submit control)
pub fn enter_patches(busy_label: &str) -> (Vec<DomPatch>, Vec<DomPatch>) {
	(
		vec![DomPatch::add_class(LOADING_CLASS)],
		vec![
			DomPatch::SetDisabled(true),
			DomPatch::SetInnerHtml(busy_label.to_string()),
		],
	)
}

/// Patches leaving the Submitting state, as (form, submit control)
pub fn exit_patches(original_label: Option<&str>) -> (Vec<DomPatch>, Vec<DomPatch>) {
	let mut button = vec![DomPatch::SetDisabled(false)];
	if let Some(label) = original_label {
		button.push(DomPatch::SetInnerHtml(label.to_string()));
	}
	(vec![DomPatch::remove_class(LOADING_CLASS)], button)
}

/// Guards forms against double submission
#[derive(Debug, Clone)]
pub struct SubmissionGuard {
	busy_label: String,
}

impl Default for SubmissionGuard {
	fn default() -> Self {
		Self::new()
	}
}

impl SubmissionGuard {
	pub fn new() -> Self {
		Self {
			busy_label: BUSY_LABEL.to_string(),
		}
	}

	/// Uses custom busy markup instead of [`BUSY_LABEL`]
	pub fn with_busy_label(mut self, label: impl Into<String>) -> Self {
		self.busy_label = label.into();
		self
	}

	pub fn is_submitting<D: Dom + ?Sized>(dom: &D, form: &D::Node) -> bool {
		dom.has_class(form, LOADING_CLASS)
	}

	/// Handles a submit event on `form`
	///
	/// Every numeric field is validated (and its error rendered) before the
	/// form may enter Submitting. A returned ticket must be paired with a
	/// fallback [`SubmissionGuard::reset`] by the caller.
	pub fn on_submit<D: Dom + ?Sized>(&self, dom: &mut D, form: &D::Node) -> SubmitDecision {
		if Self::is_submitting(dom, form) {
			debug_log!("Submit suppressed: form already submitting");
			return SubmitDecision::Blocked(BlockReason::AlreadySubmitting);
		}

		let invalid = dom
			.query_selector_all(form, &numeric_inputs())
			.iter()
			.filter(|field| !validate_field(dom, field).is_valid())
			.count();
		if invalid > 0 {
			debug_log!("Submit cancelled: {} invalid field(s)", invalid);
			return SubmitDecision::Blocked(BlockReason::InvalidFields(invalid));
		}

		let generation = dom
			.data(form, GENERATION_KEY)
			.and_then(|v| v.as_u64())
			.unwrap_or(0)
			+ 1;
		dom.set_data(form, GENERATION_KEY, serde_json::json!(generation));

		let (form_patches, button_patches) = enter_patches(&self.busy_label);
		apply_patches(dom, form, &form_patches);
		if let Some(button) = dom.query_selector(form, &submit_button()) {
			let original = dom.inner_html(&button);
			dom.set_data(&button, ORIGINAL_LABEL_KEY, serde_json::Value::String(original));
			apply_patches(dom, &button, &button_patches);
		}
		SubmitDecision::Proceed(SubmissionTicket { generation })
	}

	/// Leaves the Submitting state
	///
	/// With `Some(ticket)` the reset only applies if that ticket belongs to the
	/// current submission. `None` is an explicit completion signal and always
	/// applies. Returns whether the form was reset.
	pub fn reset<D: Dom + ?Sized>(
		&self,
		dom: &mut D,
		form: &D::Node,
		ticket: Option<SubmissionTicket>,
	) -> bool {
		if !dom.is_connected(form) || !Self::is_submitting(dom, form) {
			return false;
		}
		if let Some(ticket) = ticket {
			let current = dom.data(form, GENERATION_KEY).and_then(|v| v.as_u64());
			if current != Some(ticket.generation) {
				return false;
			}
		}

		let button = dom.query_selector(form, &submit_button());
		let original = button.as_ref().and_then(|b| {
			dom.data(b, ORIGINAL_LABEL_KEY)
				.and_then(|v| v.as_str().map(str::to_string))
		});
		let (form_patches, button_patches) = exit_patches(original.as_deref());
		apply_patches(dom, form, &form_patches);
		if let Some(button) = button {
			apply_patches(dom, &button, &button_patches);
			dom.remove_data(&button, ORIGINAL_LABEL_KEY);
		}
		info_log!("Form submission state reset");
		true
	}
}
