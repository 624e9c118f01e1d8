//! Searchable select capability
//!
//! Three select families exist on the pages, each recognised by a class and
//! rendered with its own [`OptionTemplate`]. Every family clears, spans the
//! full width and opens its dropdown inside the enclosing modal dialog when
//! there is one.

pub mod templates;

use loandesk_core::dom::{Dom, Selector};
use serde::Serialize;

pub use templates::{DATA_KEYS, Markup, OptionData, OptionTemplate};

use crate::error::WidgetResult;

/// Event fired by the select library when an option is picked
pub const SELECT_EVENT: &str = "select2:select";
/// Listener namespace used by the select library
pub const SELECT_EVENT_NAMESPACE: &str = "select2";
/// Event re-fired after a pick so that plain change handlers still run
pub const ORIGINAL_CHANGE_EVENT: &str = "change.original";

/// A class of select elements sharing one configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectFamily {
	Searchable,
	Location,
	Item,
}

impl SelectFamily {
	/// Every family, in initialization order
	pub const ALL: [Self; 3] = [Self::Searchable, Self::Location, Self::Item];

	pub fn class(&self) -> &'static str {
		match self {
			Self::Searchable => "searchable-dropdown",
			Self::Location => "location-dropdown",
			Self::Item => "item-dropdown",
		}
	}

	pub fn selector(&self) -> Selector {
		Selector::class(self.class())
	}

	/// Selector matching a select of any family
	pub fn any_selector() -> Selector {
		Self::ALL
			.iter()
			.map(Self::selector)
			.reduce(Selector::or)
			.unwrap_or_else(Selector::any)
	}

	pub fn default_placeholder(&self) -> &'static str {
		match self {
			Self::Searchable => "Search and select...",
			Self::Location => "Search locations...",
			Self::Item => "Search items...",
		}
	}

	pub fn template(&self) -> OptionTemplate {
		match self {
			Self::Searchable => OptionTemplate::Coded,
			Self::Location => OptionTemplate::Location,
			Self::Item => OptionTemplate::Item,
		}
	}

	/// Options for `select`, reading its placeholder override and locating
	/// its dropdown parent
	pub fn options_for<D: Dom + ?Sized>(&self, dom: &D, select: &D::Node) -> SelectOptions<D::Node> {
		let placeholder = match self {
			Self::Searchable => dom
				.attribute(select, "data-placeholder")
				.filter(|p| !p.is_empty())
				.unwrap_or_else(|| self.default_placeholder().to_string()),
			_ => self.default_placeholder().to_string(),
		};
		let dialog = Selector::class("modal").or(Selector::attr_eq("role", "dialog"));
		let dropdown_parent = match dom.closest(select, &dialog) {
			Some(modal) => DropdownParent::Dialog(modal),
			None => DropdownParent::Body,
		};
		SelectOptions {
			family: *self,
			placeholder,
			allow_clear: true,
			width: "100%".to_string(),
			template: self.template(),
			dropdown_parent,
		}
	}
}

/// Where the select's dropdown is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownParent<N> {
	Body,
	Dialog(N),
}

/// Options a searchable select is created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOptions<N> {
	pub family: SelectFamily,
	pub placeholder: String,
	pub allow_clear: bool,
	pub width: String,
	pub template: OptionTemplate,
	pub dropdown_parent: DropdownParent<N>,
}

impl<N> SelectOptions<N> {
	/// The serializable part of the options
	pub fn to_json(&self) -> serde_json::Value {
		serde_json::json!({
			"placeholder": self.placeholder,
			"allowClear": self.allow_clear,
			"width": self.width,
		})
	}
}

/// Operations needed from a searchable select library
pub trait SelectLibrary<D: Dom + ?Sized> {
	fn is_available(&self) -> bool;

	fn is_installed(&self, dom: &D, select: &D::Node) -> bool;

	/// Enhances `select`; the library reports picks as [`SELECT_EVENT`]
	fn create(
		&mut self,
		dom: &mut D,
		select: &D::Node,
		options: &SelectOptions<D::Node>,
	) -> WidgetResult<()>;

	fn destroy(&mut self, dom: &mut D, select: &D::Node) -> WidgetResult<()>;
}
