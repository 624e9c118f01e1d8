//! DOM abstraction layer
//!
//! Page logic never touches a concrete document. It talks to the [`Dom`]
//! trait, which is implemented by [`MemoryDom`] (tests, native builds) and by
//! the browser adapter in `loandesk-pages` on `wasm32`.
//!
//! Besides the usual element operations the trait models two things that
//! third-party widgets attach to elements and that must be cleaned up on
//! teardown:
//!
//! - **expando data**: arbitrary keys stored directly on an element
//!   (for example a grid's per-cell index bookkeeping)
//! - **namespaced listeners**: `event.namespace` records so every listener a
//!   widget registered can be removed by namespace

pub mod memory;
pub mod selector;

use std::fmt;

pub use memory::{ElementSpec, MemoryDom, NodeId, el};
pub use selector::{Selector, SelectorError};

/// Error for DOM operations that can fail on a concrete backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
	#[error("no element with id '{0}'")]
	NotFound(String),

	#[error("node is detached from the document")]
	Detached,

	#[error("backend error: {0}")]
	Backend(String),
}

/// Operations the page layer needs from a document
pub trait Dom {
	/// Handle to an element
	type Node: Clone + PartialEq + fmt::Debug;

	/// The document's root element
	fn root(&self) -> Self::Node;

	/// Looks up a connected element by id
	fn get_element_by_id(&self, id: &str) -> Option<Self::Node>;

	/// Parent element, `None` for the root or a detached node
	fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

	/// Element children in document order
	fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

	/// Whether the node is still reachable from the root
	fn is_connected(&self, node: &Self::Node) -> bool;

	/// Lowercase tag name
	fn tag_name(&self, node: &Self::Node) -> String;

	fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

	fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

	fn remove_attribute(&mut self, node: &Self::Node, name: &str);

	fn has_class(&self, node: &Self::Node, class: &str) -> bool;

	fn add_class(&mut self, node: &Self::Node, class: &str);

	fn remove_class(&mut self, node: &Self::Node, class: &str);

	/// Current value of a form control (empty for other elements)
	fn value(&self, node: &Self::Node) -> String;

	fn set_value(&mut self, node: &Self::Node, value: &str);

	/// Concatenated text of the subtree
	fn text_content(&self, node: &Self::Node) -> String;

	fn set_text_content(&mut self, node: &Self::Node, text: &str);

	/// Serialized markup of the children
	fn inner_html(&self, node: &Self::Node) -> String;

	fn set_inner_html(&mut self, node: &Self::Node, html: &str);

	fn is_disabled(&self, node: &Self::Node) -> bool;

	fn set_disabled(&mut self, node: &Self::Node, disabled: bool);

	/// Inline style property
	fn style(&self, node: &Self::Node, property: &str) -> Option<String>;

	fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);

	/// Creates a detached element
	fn create_element(&mut self, tag: &str) -> Self::Node;

	fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

	/// Inserts `child` into `parent` right before `reference`
	fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, reference: &Self::Node);

	/// Detaches the node from its parent
	fn remove(&mut self, node: &Self::Node);

	/// Replaces the node with a deep copy of itself that carries no listeners
	/// and no expando data; returns the copy.
	fn replace_with_clone(&mut self, node: &Self::Node) -> Self::Node;

	/// Stores an expando value on the element
	fn set_data(&mut self, node: &Self::Node, key: &str, value: serde_json::Value);

	fn data(&self, node: &Self::Node, key: &str) -> Option<serde_json::Value>;

	fn remove_data(&mut self, node: &Self::Node, key: &str);

	/// Keys of every expando value stored on the element
	fn data_keys(&self, node: &Self::Node) -> Vec<String>;

	/// Drops every expando value on the element
	fn clear_data(&mut self, node: &Self::Node) {
		for key in self.data_keys(node) {
			self.remove_data(node, &key);
		}
	}

	/// Records a listener under `event` or `event.namespace`
	fn add_listener(&mut self, node: &Self::Node, event: &str);

	/// Removes every listener registered under `namespace`; returns how many
	fn remove_listeners(&mut self, node: &Self::Node, namespace: &str) -> usize;

	/// Listener records currently attached to the element
	fn listeners(&self, node: &Self::Node) -> Vec<String>;

	fn focus(&mut self, node: &Self::Node);

	fn active_element(&self) -> Option<Self::Node>;

	/// Whether `node` matches `selector`
	fn matches(&self, node: &Self::Node, selector: &Selector) -> bool {
		selector.matches(self, node)
	}

	/// Every descendant of `scope` (excluding `scope`) matching `selector`,
	/// in document order
	fn query_selector_all(&self, scope: &Self::Node, selector: &Selector) -> Vec<Self::Node> {
		let mut found = Vec::new();
		let mut stack: Vec<Self::Node> = self.children(scope).into_iter().rev().collect();
		while let Some(node) = stack.pop() {
			if selector.matches(self, &node) {
				found.push(node.clone());
			}
			stack.extend(self.children(&node).into_iter().rev());
		}
		found
	}

	/// First descendant of `scope` matching `selector`
	fn query_selector(&self, scope: &Self::Node, selector: &Selector) -> Option<Self::Node> {
		self.query_selector_all(scope, selector).into_iter().next()
	}

	/// Document-wide query
	fn select_all(&self, selector: &Selector) -> Vec<Self::Node> {
		let root = self.root();
		let mut found = Vec::new();
		if selector.matches(self, &root) {
			found.push(root.clone());
		}
		found.extend(self.query_selector_all(&root, selector));
		found
	}

	/// Nearest inclusive ancestor matching `selector`
	fn closest(&self, node: &Self::Node, selector: &Selector) -> Option<Self::Node> {
		let mut current = Some(node.clone());
		while let Some(candidate) = current {
			if selector.matches(self, &candidate) {
				return Some(candidate);
			}
			current = self.parent(&candidate);
		}
		None
	}

	/// Direct children matching `selector`
	fn children_matching(&self, node: &Self::Node, selector: &Selector) -> Vec<Self::Node> {
		self.children(node)
			.into_iter()
			.filter(|child| selector.matches(self, child))
			.collect()
	}
}
