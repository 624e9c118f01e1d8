//! [`Dom`] over the browser document
//!
//! Expando data lives in own properties of the element, which is also where
//! the grid plugin keeps its per-cell bookkeeping, so scrubbing sees both.
//! Listener records are kept in one reserved property. Handlers and data a
//! plugin attached through jQuery live in jQuery's own store, so teardown
//! also goes through jQuery when it is loaded.

use js_sys::{Array, Object, Reflect};
use loandesk_core::dom::{Dom, Selector};
use loandesk_core::warn_log;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use super::js::{describe, from_js, jquery, jquery_private_data, to_js};

/// Own property holding the listener records
const LISTENERS_KEY: &str = "__loandeskListeners";

/// The live document
#[derive(Debug, Clone)]
pub struct WebDom {
	document: Document,
	root: Element,
}

impl WebDom {
	/// The window's document; `None` outside a browsing context
	pub fn from_window() -> Option<Self> {
		let document = web_sys::window()?.document()?;
		let root = document.document_element()?;
		Some(Self { document, root })
	}

	pub fn document(&self) -> &Document {
		&self.document
	}
}

fn check(result: Result<(), JsValue>, action: &str) {
	if let Err(err) = result {
		warn_log!("DOM {} failed: {}", action, describe(&err));
	}
}

fn property(node: &Element, key: &str) -> JsValue {
	Reflect::get(node, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn set_property(node: &Element, key: &str, value: &JsValue) {
	if let Err(err) = Reflect::set(node, &JsValue::from_str(key), value) {
		warn_log!("Setting '{}' failed: {}", key, describe(&err));
	}
}

fn listener_records(node: &Element) -> Vec<String> {
	let records = property(node, LISTENERS_KEY);
	if !Array::is_array(&records) {
		return Vec::new();
	}
	Array::from(&records)
		.iter()
		.filter_map(|record| record.as_string())
		.collect()
}

fn store_listener_records(node: &Element, records: &[String]) {
	let array: Array = records.iter().map(|r| JsValue::from_str(r)).collect();
	set_property(node, LISTENERS_KEY, &array);
}

/// Handlers jQuery holds for `node` whose namespaces include `namespace`
fn jquery_handler_count(node: &Element, namespace: &str) -> usize {
	let Ok(events) = jquery_private_data(node, "events") else {
		return 0;
	};
	if !events.is_object() {
		return 0;
	}
	Object::values(events.unchecked_ref::<Object>())
		.iter()
		.filter(|handlers| Array::is_array(handlers))
		.flat_map(|handlers| Array::from(&handlers).iter().collect::<Vec<_>>())
		.filter(|handler| {
			Reflect::get(handler, &JsValue::from_str("namespace"))
				.ok()
				.and_then(|ns| ns.as_string())
				.is_some_and(|ns| ns.split('.').any(|part| part == namespace))
		})
		.count()
}

impl Dom for WebDom {
	type Node = Element;

	fn root(&self) -> Element {
		self.root.clone()
	}

	fn get_element_by_id(&self, id: &str) -> Option<Element> {
		self.document.get_element_by_id(id)
	}

	fn parent(&self, node: &Element) -> Option<Element> {
		node.parent_element()
	}

	fn children(&self, node: &Element) -> Vec<Element> {
		let collection = node.children();
		(0..collection.length())
			.filter_map(|i| collection.item(i))
			.collect()
	}

	fn is_connected(&self, node: &Element) -> bool {
		node.is_connected()
	}

	fn tag_name(&self, node: &Element) -> String {
		node.tag_name().to_ascii_lowercase()
	}

	fn attribute(&self, node: &Element, name: &str) -> Option<String> {
		node.get_attribute(name)
	}

	fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
		check(node.set_attribute(name, value), "set_attribute");
	}

	fn remove_attribute(&mut self, node: &Element, name: &str) {
		check(node.remove_attribute(name), "remove_attribute");
	}

	fn has_class(&self, node: &Element, class: &str) -> bool {
		node.class_list().contains(class)
	}

	fn add_class(&mut self, node: &Element, class: &str) {
		check(node.class_list().add_1(class), "add_class");
	}

	fn remove_class(&mut self, node: &Element, class: &str) {
		check(node.class_list().remove_1(class), "remove_class");
	}

	fn value(&self, node: &Element) -> String {
		property(node, "value").as_string().unwrap_or_default()
	}

	fn set_value(&mut self, node: &Element, value: &str) {
		set_property(node, "value", &JsValue::from_str(value));
	}

	fn text_content(&self, node: &Element) -> String {
		node.text_content().unwrap_or_default()
	}

	fn set_text_content(&mut self, node: &Element, text: &str) {
		node.set_text_content(Some(text));
	}

	fn inner_html(&self, node: &Element) -> String {
		node.inner_html()
	}

	fn set_inner_html(&mut self, node: &Element, html: &str) {
		node.set_inner_html(html);
	}

	fn is_disabled(&self, node: &Element) -> bool {
		property(node, "disabled").as_bool().unwrap_or(false)
	}

	fn set_disabled(&mut self, node: &Element, disabled: bool) {
		set_property(node, "disabled", &JsValue::from_bool(disabled));
	}

	fn style(&self, node: &Element, property: &str) -> Option<String> {
		node.dyn_ref::<HtmlElement>()?
			.style()
			.get_property_value(property)
			.ok()
			.filter(|value| !value.is_empty())
	}

	fn set_style(&mut self, node: &Element, property: &str, value: &str) {
		if let Some(element) = node.dyn_ref::<HtmlElement>() {
			check(element.style().set_property(property, value), "set_style");
		}
	}

	fn create_element(&mut self, tag: &str) -> Element {
		self.document
			.create_element(tag)
			.expect("Failed to create element")
	}

	fn append_child(&mut self, parent: &Element, child: &Element) {
		check(parent.append_child(child).map(drop), "append_child");
	}

	fn insert_before(&mut self, parent: &Element, child: &Element, reference: &Element) {
		check(
			parent.insert_before(child, Some(reference)).map(drop),
			"insert_before",
		);
	}

	fn remove(&mut self, node: &Element) {
		node.remove();
	}

	fn replace_with_clone(&mut self, node: &Element) -> Element {
		let copy = node
			.clone_node_with_deep(true)
			.ok()
			.and_then(|copy| copy.dyn_into::<Element>().ok());
		match copy {
			Some(copy) => {
				check(node.replace_with_with_node_1(&copy), "replace_with");
				copy
			}
			None => node.clone(),
		}
	}

	fn set_data(&mut self, node: &Element, key: &str, value: serde_json::Value) {
		set_property(node, key, &to_js(&value));
	}

	fn data(&self, node: &Element, key: &str) -> Option<serde_json::Value> {
		if !node.has_own_property(&JsValue::from_str(key)) {
			return None;
		}
		from_js(&property(node, key))
	}

	fn remove_data(&mut self, node: &Element, key: &str) {
		check(
			Reflect::delete_property(node, &JsValue::from_str(key)).map(drop),
			"remove_data",
		);
	}

	fn data_keys(&self, node: &Element) -> Vec<String> {
		Object::keys(node)
			.iter()
			.filter_map(|key| key.as_string())
			.filter(|key| key != LISTENERS_KEY && !key.starts_with("jQuery"))
			.collect()
	}

	fn clear_data(&mut self, node: &Element) {
		for key in self.data_keys(node) {
			self.remove_data(node, &key);
		}
		if let Ok(wrapped) = jquery(node) {
			check(wrapped.remove_data().map(drop), "removeData");
		}
	}

	fn add_listener(&mut self, node: &Element, event: &str) {
		let mut records = listener_records(node);
		records.push(event.to_string());
		store_listener_records(node, &records);
	}

	fn remove_listeners(&mut self, node: &Element, namespace: &str) -> usize {
		let suffix = format!(".{namespace}");
		let records = listener_records(node);
		let kept: Vec<String> = records
			.iter()
			.filter(|record| !record.ends_with(&suffix))
			.cloned()
			.collect();
		store_listener_records(node, &kept);

		let mut removed = records.len() - kept.len();
		if let Ok(wrapped) = jquery(node) {
			removed += jquery_handler_count(node, namespace);
			check(wrapped.off(&suffix).map(drop), "off");
		}
		removed
	}

	fn listeners(&self, node: &Element) -> Vec<String> {
		listener_records(node)
	}

	fn focus(&mut self, node: &Element) {
		if let Some(element) = node.dyn_ref::<HtmlElement>() {
			check(element.focus(), "focus");
		}
	}

	fn active_element(&self) -> Option<Element> {
		self.document.active_element()
	}

	fn matches(&self, node: &Element, selector: &Selector) -> bool {
		node.matches(&selector.to_string()).unwrap_or(false)
	}

	fn query_selector_all(&self, scope: &Element, selector: &Selector) -> Vec<Element> {
		let Ok(list) = scope.query_selector_all(&selector.to_string()) else {
			return Vec::new();
		};
		(0..list.length())
			.filter_map(|i| list.item(i))
			.filter_map(|node| node.dyn_into::<Element>().ok())
			.collect()
	}
}
