//! Event bindings
//!
//! Bootstrap records which handler runs for which element and event in an
//! [`EventRegistry`]. The runtime routes every incoming [`PageEvent`] through
//! the registry; the browser adapter forwards real events into it.
//!
//! Each binding is also recorded on the element as a namespaced listener
//! (`blur.loandesk`), so namespace-based teardown sees it like any other.

use std::fmt;

use loandesk_core::dom::Dom;

use crate::callback::Callback;

/// Namespace of the listeners the page layer registers
pub const EVENT_NAMESPACE: &str = "loandesk";

/// Event types the page layer handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
	Input,
	Blur,
	Change,
	Submit,
	Click,
	MouseEnter,
	MouseLeave,
	/// An option was picked in a searchable select
	SelectPicked,
}

impl EventType {
	pub const ALL: [Self; 8] = [
		Self::Input,
		Self::Blur,
		Self::Change,
		Self::Submit,
		Self::Click,
		Self::MouseEnter,
		Self::MouseLeave,
		Self::SelectPicked,
	];

	/// Browser event name
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Input => "input",
			Self::Blur => "blur",
			Self::Change => "change",
			Self::Submit => "submit",
			Self::Click => "click",
			Self::MouseEnter => "mouseenter",
			Self::MouseLeave => "mouseleave",
			Self::SelectPicked => "select2:select",
		}
	}

	pub fn parse(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.as_str() == name)
	}
}

impl fmt::Display for EventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// An event delivered to the page
#[derive(Debug, Clone, PartialEq)]
pub struct PageEvent<N> {
	pub kind: EventType,
	pub target: N,
	/// Restricts delivery to bindings of this namespace, as a
	/// `change.original` trigger does
	pub namespace: Option<String>,
}

impl<N> PageEvent<N> {
	pub fn new(kind: EventType, target: N) -> Self {
		Self {
			kind,
			target,
			namespace: None,
		}
	}

	pub fn namespaced(mut self, namespace: impl Into<String>) -> Self {
		self.namespace = Some(namespace.into());
		self
	}

	/// Parses `type` or `type.namespace`
	///
	/// # Examples
	///
	/// ```
	/// use loandesk_pages::events::{EventType, PageEvent};
	///
	/// let event = PageEvent::parse("change.original", 7).unwrap();
	/// assert_eq!(event.kind, EventType::Change);
	/// assert_eq!(event.namespace.as_deref(), Some("original"));
	/// assert!(PageEvent::parse("scroll", 7).is_none());
	/// ```
	pub fn parse(name: &str, target: N) -> Option<Self> {
		let (kind, namespace) = match name.split_once('.') {
			Some((kind, namespace)) => (kind, Some(namespace.to_string())),
			None => (name, None),
		};
		Some(Self {
			kind: EventType::parse(kind)?,
			target,
			namespace,
		})
	}
}

/// What a binding does when its event fires
#[derive(Debug, Clone, PartialEq)]
pub enum Handler<N> {
	/// Blur on a numeric field
	ValidateNumeric,
	/// Typing into a numeric field: clear the error, recompute derived fields
	NumericInput,
	/// Change of a date field
	ValidateDate,
	GuardSubmit,
	HoverLift,
	HoverDrop,
	OpenModal(N),
	SelectPicked,
	/// Handler registered by another page script
	Custom(Callback<PageEvent<N>>),
}

/// A binding between an event and its handler
#[derive(Debug, Clone, PartialEq)]
pub struct EventBinding<N> {
	pub event_type: EventType,
	pub namespace: String,
	pub handler: Handler<N>,
}

impl<N> EventBinding<N> {
	pub fn new(event_type: EventType, handler: Handler<N>) -> Self {
		Self {
			event_type,
			namespace: EVENT_NAMESPACE.to_string(),
			handler,
		}
	}

	pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
		self.namespace = namespace.into();
		self
	}

	/// Listener name recorded on the element
	pub fn listener_name(&self) -> String {
		format!("{}.{}", self.event_type, self.namespace)
	}

	fn accepts(&self, event: &PageEvent<N>) -> bool {
		self.event_type == event.kind
			&& event
				.namespace
				.as_deref()
				.is_none_or(|namespace| namespace == self.namespace)
	}
}

/// Registry of every binding the page layer installed
#[derive(Debug)]
pub struct EventRegistry<N> {
	bindings: Vec<(N, EventBinding<N>)>,
}

impl<N> Default for EventRegistry<N> {
	fn default() -> Self {
		Self {
			bindings: Vec::new(),
		}
	}
}

impl<N: Clone + PartialEq> EventRegistry<N> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds `binding` to `node` and records its listener on the element
	pub fn register<D>(&mut self, dom: &mut D, node: &N, binding: EventBinding<N>)
	where
		D: Dom<Node = N> + ?Sized,
	{
		dom.add_listener(node, &binding.listener_name());
		self.bindings.push((node.clone(), binding));
	}

	/// Like [`EventRegistry::register`], unless an equal binding exists
	///
	/// Returns whether the binding was added.
	pub fn register_once<D>(&mut self, dom: &mut D, node: &N, binding: EventBinding<N>) -> bool
	where
		D: Dom<Node = N> + ?Sized,
	{
		let exists = self
			.bindings
			.iter()
			.any(|(bound, existing)| bound == node && *existing == binding);
		if !exists {
			self.register(dom, node, binding);
		}
		!exists
	}

	/// Removes every binding of `node`
	pub fn unregister<D>(&mut self, dom: &mut D, node: &N)
	where
		D: Dom<Node = N> + ?Sized,
	{
		let mut namespaces = Vec::new();
		self.bindings.retain(|(bound, binding)| {
			if bound == node {
				namespaces.push(binding.namespace.clone());
				false
			} else {
				true
			}
		});
		namespaces.dedup();
		for namespace in namespaces {
			dom.remove_listeners(node, &namespace);
		}
	}

	/// Drops bindings of elements no longer in the document
	pub fn prune<D>(&mut self, dom: &D) -> usize
	where
		D: Dom<Node = N> + ?Sized,
	{
		let before = self.bindings.len();
		self.bindings.retain(|(node, _)| dom.is_connected(node));
		before - self.bindings.len()
	}

	/// Handlers that receive `event`, in registration order
	pub fn handlers_for(&self, event: &PageEvent<N>) -> Vec<Handler<N>> {
		self.bindings
			.iter()
			.filter(|(node, binding)| *node == event.target && binding.accepts(event))
			.map(|(_, binding)| binding.handler.clone())
			.collect()
	}

	pub fn entries(&self) -> impl Iterator<Item = (&N, &EventBinding<N>)> {
		self.bindings.iter().map(|(node, binding)| (node, binding))
	}

	pub fn clear(&mut self) {
		self.bindings.clear();
	}

	/// Number of bindings
	pub fn len(&self) -> usize {
		self.bindings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}
}

/// Result of dispatching one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
	/// No binding matched
	Ignored,
	Handled,
	/// The browser's default action must be cancelled
	PreventDefault,
}

impl Dispatch {
	/// Combines the results of two handlers of the same event
	pub fn merge(self, other: Self) -> Self {
		match (self, other) {
			(Self::PreventDefault, _) | (_, Self::PreventDefault) => Self::PreventDefault,
			(Self::Handled, _) | (_, Self::Handled) => Self::Handled,
			_ => Self::Ignored,
		}
	}

	pub fn default_prevented(&self) -> bool {
		matches!(self, Self::PreventDefault)
	}
}
