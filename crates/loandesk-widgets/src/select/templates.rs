//! Option templates for searchable selects
//!
//! A template turns one `<option>` (its value, label and data attributes)
//! into the markup shown in the result list and in the selection box.

use std::collections::BTreeMap;

use loandesk_core::dom::Dom;
use loandesk_core::dom::memory::html_escape;
use serde::{Deserialize, Serialize};

/// The data a template sees for one option
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionData {
	/// Option value; empty for the placeholder option
	pub id: String,
	pub text: String,
	/// `data-*` values keyed without the prefix
	#[serde(default)]
	pub data: BTreeMap<String, String>,
}

impl OptionData {
	pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			text: text.into(),
			data: BTreeMap::new(),
		}
	}

	pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.data.insert(key.into(), value.into());
		self
	}

	/// Non-empty data value
	pub fn get(&self, key: &str) -> Option<&str> {
		self.data
			.get(key)
			.map(String::as_str)
			.filter(|v| !v.is_empty())
	}

	/// Reads an `<option>` element
	///
	/// Values stored on the element itself take precedence over its
	/// `data-*` attributes.
	pub fn from_element<D: Dom + ?Sized>(dom: &D, option: &D::Node) -> Self {
		let mut data = BTreeMap::new();
		for key in DATA_KEYS {
			if let Some(value) = dom.attribute(option, &format!("data-{key}")) {
				data.insert((*key).to_string(), value);
			}
		}
		for key in dom.data_keys(option) {
			if let Some(value) = dom.data(option, &key) {
				let text = match value {
					serde_json::Value::String(s) => s,
					other => other.to_string(),
				};
				data.insert(key, text);
			}
		}
		Self {
			id: dom
				.attribute(option, "value")
				.unwrap_or_else(|| dom.value(option)),
			text: dom.text_content(option).trim().to_string(),
			data,
		}
	}
}

/// Data attributes the templates read
pub const DATA_KEYS: &[&str] = &["code", "description", "office", "room", "category", "unit"];

/// Template output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
	/// Plain text, escaped when rendered
	Text(String),
	/// Trusted markup whose text parts are already escaped
	Html(String),
}

impl Markup {
	pub fn to_html(&self) -> String {
		match self {
			Self::Text(text) => html_escape(text),
			Self::Html(html) => html.clone(),
		}
	}
}

/// Rendering style of a select family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionTemplate {
	/// Code and description around the label
	Coded,
	/// Code, then office and room
	Location,
	/// Code, label, then category and unit
	Item,
}

impl OptionTemplate {
	/// Markup of an entry in the result list
	pub fn result(&self, option: &OptionData) -> Markup {
		if option.id.is_empty() {
			return Markup::Text(option.text.clone());
		}
		match self {
			Self::Coded => coded_result(option),
			Self::Location => location_result(option),
			Self::Item => item_result(option),
		}
	}

	/// Markup of the selected entry
	pub fn selection(&self, option: &OptionData) -> Markup {
		match (self, option.get("code")) {
			(Self::Coded, Some(code)) if !option.id.is_empty() => {
				Markup::Text(format!("{code} - {}", option.text))
			}
			_ => Markup::Text(option.text.clone()),
		}
	}
}

fn coded_result(option: &OptionData) -> Markup {
	let code = option.get("code");
	let description = option.get("description");
	if code.is_none() && description.is_none() {
		return Markup::Text(option.text.clone());
	}
	let mut html = String::from("<span>");
	if let Some(code) = code {
		html.push_str(&format!("<strong>{} - </strong>", html_escape(code)));
	}
	html.push_str(&format!("<span>{}</span>", html_escape(&option.text)));
	if let Some(description) = description {
		html.push_str(&format!(
			"<br><small class=\"text-gray-400\">{}</small>",
			html_escape(description)
		));
	}
	html.push_str("</span>");
	Markup::Html(html)
}

fn location_result(option: &OptionData) -> Markup {
	let mut html = String::from("<div>");
	if let Some(code) = option.get("code") {
		html.push_str(&format!(
			"<strong class=\"text-blue-300\">{}</strong> - ",
			html_escape(code)
		));
	}
	match option.get("office") {
		Some(office) => {
			html.push_str(&format!("<span>{}</span>", html_escape(office)));
			if let Some(room) = option.get("room") {
				html.push_str(&format!(", {}", html_escape(room)));
			}
		}
		None => html.push_str(&format!("<span>{}</span>", html_escape(&option.text))),
	}
	html.push_str("</div>");
	Markup::Html(html)
}

fn item_result(option: &OptionData) -> Markup {
	let mut html = String::from("<div>");
	if let Some(code) = option.get("code") {
		html.push_str(&format!(
			"<strong class=\"text-green-300\">{}</strong> - ",
			html_escape(code)
		));
	}
	html.push_str(&format!("<span>{}</span>", html_escape(&option.text)));

	let meta: Vec<String> = [("Category", option.get("category")), ("Unit", option.get("unit"))]
		.into_iter()
		.filter_map(|(label, value)| value.map(|v| format!("{label}: {}", html_escape(v))))
		.collect();
	if !meta.is_empty() {
		html.push_str(&format!(
			"<div class=\"text-xs text-gray-400 mt-1\">{}</div>",
			meta.join(" | ")
		));
	}
	html.push_str("</div>");
	Markup::Html(html)
}

#[cfg(test)]
mod tests {
	use super::*;
	use loandesk_core::dom::{MemoryDom, el};
	use rstest::rstest;

	#[rstest]
	fn test_coded_templates() {
		let option = OptionData::new("7", "Rice")
			.with_data("code", "C-7")
			.with_data("description", "Long grain");
		assert_eq!(
			OptionTemplate::Coded.result(&option).to_html(),
			"<span><strong>C-7 - </strong><span>Rice</span><br><small class=\"text-gray-400\">Long grain</small></span>"
		);
		assert_eq!(
			OptionTemplate::Coded.selection(&option),
			Markup::Text("C-7 - Rice".into())
		);
	}

	#[rstest]
	fn test_coded_without_data_is_plain_text() {
		let option = OptionData::new("1", "Plain <b>");
		assert_eq!(
			OptionTemplate::Coded.result(&option),
			Markup::Text("Plain <b>".into())
		);
		assert_eq!(OptionTemplate::Coded.result(&option).to_html(), "Plain &lt;b&gt;");
	}

	#[rstest]
	fn test_placeholder_option_is_plain() {
		let option = OptionData::new("", "Search and select...").with_data("code", "X");
		assert_eq!(
			OptionTemplate::Item.result(&option),
			Markup::Text("Search and select...".into())
		);
		assert_eq!(
			OptionTemplate::Coded.selection(&option),
			Markup::Text("Search and select...".into())
		);
	}

	#[rstest]
	#[case(OptionData::new("1", "HQ").with_data("code", "L1").with_data("office", "Main").with_data("room", "204"),
		"<div><strong class=\"text-blue-300\">L1</strong> - <span>Main</span>, 204</div>")]
	#[case(OptionData::new("1", "HQ").with_data("room", "204"), "<div><span>HQ</span></div>")]
	fn test_location_template(#[case] option: OptionData, #[case] expected: &str) {
		assert_eq!(OptionTemplate::Location.result(&option).to_html(), expected);
	}

	#[rstest]
	#[case(OptionData::new("1", "Bolt").with_data("code", "I9").with_data("category", "Hardware").with_data("unit", "pcs"),
		"<div><strong class=\"text-green-300\">I9</strong> - <span>Bolt</span><div class=\"text-xs text-gray-400 mt-1\">Category: Hardware | Unit: pcs</div></div>")]
	#[case(OptionData::new("1", "Bolt").with_data("unit", "pcs"),
		"<div><span>Bolt</span><div class=\"text-xs text-gray-400 mt-1\">Unit: pcs</div></div>")]
	#[case(OptionData::new("1", "Bolt"), "<div><span>Bolt</span></div>")]
	fn test_item_template(#[case] option: OptionData, #[case] expected: &str) {
		assert_eq!(OptionTemplate::Item.result(&option).to_html(), expected);
	}

	#[rstest]
	fn test_from_element_prefers_stored_data() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let option = dom.append(
			body,
			el("option")
				.attr("value", "42")
				.attr("data-code", "OLD")
				.attr("data-unit", "kg")
				.text(" Flour "),
		);
		dom.set_data(&option, "code", serde_json::json!("NEW"));

		let data = OptionData::from_element(&dom, &option);
		assert_eq!(data.id, "42");
		assert_eq!(data.text, "Flour");
		assert_eq!(data.get("code"), Some("NEW"));
		assert_eq!(data.get("unit"), Some("kg"));
	}
}
