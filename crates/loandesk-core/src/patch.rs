//! DOM patch instructions
//!
//! Validation and derived-field logic compute `Vec<DomPatch>` from plain
//! values. [`apply_patches`] is the only place those instructions touch a
//! document.

use crate::dom::{Dom, Selector};

/// Class of the inline error node rendered next to an invalid field
pub const FEEDBACK_CLASS: &str = "invalid-feedback";

/// A single mutation of one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomPatch {
	AddClass(String),
	RemoveClass(String),
	SetAttribute { name: String, value: String },
	RemoveAttribute(String),
	SetValue(String),
	SetText(String),
	SetDisabled(bool),
	SetInnerHtml(String),
	/// Empty value clears the property
	SetStyle { property: String, value: String },
	/// Replaces any feedback node next to the element with one carrying `message`
	ShowFeedback(String),
	/// Removes every feedback node next to the element
	ClearFeedback,
	Focus,
}

impl DomPatch {
	pub fn add_class(class: impl Into<String>) -> Self {
		Self::AddClass(class.into())
	}

	pub fn remove_class(class: impl Into<String>) -> Self {
		Self::RemoveClass(class.into())
	}

	pub fn set_attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self::SetAttribute {
			name: name.into(),
			value: value.into(),
		}
	}

	pub fn set_style(property: impl Into<String>, value: impl Into<String>) -> Self {
		Self::SetStyle {
			property: property.into(),
			value: value.into(),
		}
	}
}

/// Applies `patches` to `node` in order
///
/// Detached nodes are skipped silently: a timer may fire after the element it
/// targets has been replaced.
pub fn apply_patches<D: Dom + ?Sized>(dom: &mut D, node: &D::Node, patches: &[DomPatch]) {
	if !dom.is_connected(node) {
		return;
	}
	for patch in patches {
		apply_patch(dom, node, patch);
	}
}

fn apply_patch<D: Dom + ?Sized>(dom: &mut D, node: &D::Node, patch: &DomPatch) {
	match patch {
		DomPatch::AddClass(class) => dom.add_class(node, class),
		DomPatch::RemoveClass(class) => dom.remove_class(node, class),
		DomPatch::SetAttribute { name, value } => dom.set_attribute(node, name, value),
		DomPatch::RemoveAttribute(name) => dom.remove_attribute(node, name),
		DomPatch::SetValue(value) => dom.set_value(node, value),
		DomPatch::SetText(text) => dom.set_text_content(node, text),
		DomPatch::SetDisabled(disabled) => dom.set_disabled(node, *disabled),
		DomPatch::SetInnerHtml(html) => dom.set_inner_html(node, html),
		DomPatch::SetStyle { property, value } => dom.set_style(node, property, value),
		DomPatch::ShowFeedback(message) => show_feedback(dom, node, message),
		DomPatch::ClearFeedback => {
			for sibling in feedback_siblings(dom, node) {
				dom.remove(&sibling);
			}
		}
		DomPatch::Focus => dom.focus(node),
	}
}

fn feedback_siblings<D: Dom + ?Sized>(dom: &D, node: &D::Node) -> Vec<D::Node> {
	let Some(parent) = dom.parent(node) else {
		return Vec::new();
	};
	dom.children_matching(&parent, &Selector::class(FEEDBACK_CLASS))
		.into_iter()
		.filter(|sibling| sibling != node)
		.collect()
}

fn show_feedback<D: Dom + ?Sized>(dom: &mut D, node: &D::Node, message: &str) {
	for sibling in feedback_siblings(dom, node) {
		dom.remove(&sibling);
	}
	let Some(parent) = dom.parent(node) else {
		return;
	};
	let feedback = dom.create_element("div");
	dom.add_class(&feedback, FEEDBACK_CLASS);
	dom.set_text_content(&feedback, message);

	let siblings = dom.children(&parent);
	let next = siblings
		.iter()
		.position(|child| child == node)
		.and_then(|index| siblings.get(index + 1));
	match next {
		Some(reference) => dom.insert_before(&parent, &feedback, reference),
		None => dom.append_child(&parent, &feedback),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::{MemoryDom, NodeId, el};
	use rstest::rstest;

	fn field_dom() -> (MemoryDom, NodeId, NodeId) {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let group = dom.append(
			body,
			el("div")
				.class("mb-3")
				.child(el("input").id("amount").attr("type", "number"))
				.child(el("small").class("form-text").text("Optional")),
		);
		let input = dom.get_element_by_id("amount").unwrap();
		(dom, group, input)
	}

	#[rstest]
	fn test_show_feedback_replaces_existing_node() {
		let (mut dom, group, input) = field_dom();
		let patches = vec![
			DomPatch::add_class("is-invalid"),
			DomPatch::ShowFeedback("Please enter a valid number".into()),
		];
		apply_patches(&mut dom, &input, &patches);
		apply_patches(&mut dom, &input, &[DomPatch::ShowFeedback("Please enter a positive number".into())]);

		let feedback = dom.query_selector_all(&group, &Selector::class(FEEDBACK_CLASS));
		assert_eq!(feedback.len(), 1);
		assert_eq!(dom.text_content(&feedback[0]), "Please enter a positive number");

		// rendered right after the field
		let children = dom.children(&group);
		assert_eq!(children[1], feedback[0]);
	}

	#[rstest]
	fn test_clear_feedback() {
		let (mut dom, group, input) = field_dom();
		apply_patches(&mut dom, &input, &[DomPatch::ShowFeedback("bad".into())]);
		apply_patches(
			&mut dom,
			&input,
			&[DomPatch::remove_class("is-invalid"), DomPatch::ClearFeedback],
		);
		assert!(dom.query_selector(&group, &Selector::class(FEEDBACK_CLASS)).is_none());
		assert_eq!(dom.children(&group).len(), 2);
	}

	#[rstest]
	fn test_detached_node_is_skipped() {
		let (mut dom, _group, input) = field_dom();
		dom.remove(&input);
		apply_patches(&mut dom, &input, &[DomPatch::add_class("is-invalid")]);
		assert!(!dom.has_class(&input, "is-invalid"));
	}

	#[rstest]
	fn test_style_and_disabled() {
		let (mut dom, _group, input) = field_dom();
		apply_patches(
			&mut dom,
			&input,
			&[
				DomPatch::SetDisabled(true),
				DomPatch::set_style("opacity", "0"),
				DomPatch::Focus,
			],
		);
		assert!(dom.is_disabled(&input));
		assert_eq!(dom.style(&input, "opacity").as_deref(), Some("0"));
		assert_eq!(dom.active_element(), Some(input));
	}
}
