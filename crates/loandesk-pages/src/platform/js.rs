//! JavaScript bindings and value conversion helpers

use js_sys::{Function, JSON, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Looks up `window.a.b.c`; `None` if any step is missing
pub(crate) fn global_path(path: &[&str]) -> Option<JsValue> {
	let mut current: JsValue = js_sys::global().into();
	for key in path {
		current = Reflect::get(&current, &JsValue::from_str(key)).ok()?;
		if current.is_undefined() || current.is_null() {
			return None;
		}
	}
	Some(current)
}

pub(crate) fn to_js(value: &serde_json::Value) -> JsValue {
	JSON::parse(&value.to_string()).unwrap_or(JsValue::UNDEFINED)
}

/// JSON view of a JavaScript value; `None` for values JSON cannot carry
pub(crate) fn from_js(value: &JsValue) -> Option<serde_json::Value> {
	if value.is_undefined() || value.is_function() {
		return None;
	}
	let text = JSON::stringify(value).ok()?.as_string()?;
	serde_json::from_str(&text).ok()
}

/// Readable message of a thrown value
pub(crate) fn describe(error: &JsValue) -> String {
	if let Some(text) = error.as_string() {
		return text;
	}
	match error.dyn_ref::<js_sys::Error>() {
		Some(error) => String::from(error.message()),
		None => format!("{error:?}"),
	}
}

#[wasm_bindgen]
extern "C" {
	pub(crate) type JQuery;

	#[wasm_bindgen(catch, js_name = jQuery)]
	pub(crate) fn jquery(element: &JsValue) -> Result<JQuery, JsValue>;

	#[wasm_bindgen(method, catch, js_name = DataTable)]
	pub(crate) fn data_table(this: &JQuery, options: &JsValue) -> Result<DataTableApi, JsValue>;

	/// API of the grid already bound to the element
	#[wasm_bindgen(method, catch, js_name = DataTable)]
	pub(crate) fn data_table_api(this: &JQuery) -> Result<DataTableApi, JsValue>;

	#[wasm_bindgen(method, catch)]
	pub(crate) fn select2(this: &JQuery, options: &JsValue) -> Result<JQuery, JsValue>;

	#[wasm_bindgen(method, catch, js_name = select2)]
	pub(crate) fn select2_command(this: &JQuery, command: &str) -> Result<JsValue, JsValue>;

	#[wasm_bindgen(method, catch, js_name = hasClass)]
	pub(crate) fn has_class(this: &JQuery, class: &str) -> Result<bool, JsValue>;

	#[wasm_bindgen(method, catch)]
	pub(crate) fn on(this: &JQuery, events: &str, handler: &Function) -> Result<JQuery, JsValue>;

	#[wasm_bindgen(method, catch)]
	pub(crate) fn trigger(this: &JQuery, event: &str) -> Result<JQuery, JsValue>;

	/// Detaches handlers bound through jQuery, e.g. `.dt` for a whole namespace
	#[wasm_bindgen(method, catch)]
	pub(crate) fn off(this: &JQuery, events: &str) -> Result<JQuery, JsValue>;

	/// Drops everything in jQuery's data store for the element
	#[wasm_bindgen(method, catch, js_name = removeData)]
	pub(crate) fn remove_data(this: &JQuery) -> Result<JQuery, JsValue>;

	/// jQuery's private per-element store; `"events"` holds bound handlers
	#[wasm_bindgen(catch, js_namespace = jQuery, js_name = _data)]
	pub(crate) fn jquery_private_data(element: &JsValue, name: &str) -> Result<JsValue, JsValue>;

	pub(crate) type DataTableApi;

	#[wasm_bindgen(method, catch)]
	pub(crate) fn clear(this: &DataTableApi) -> Result<DataTableApi, JsValue>;

	#[wasm_bindgen(method, catch)]
	pub(crate) fn draw(this: &DataTableApi) -> Result<DataTableApi, JsValue>;

	#[wasm_bindgen(method, catch)]
	pub(crate) fn destroy(this: &DataTableApi, remove: bool) -> Result<JsValue, JsValue>;

	#[wasm_bindgen(catch, js_namespace = ["jQuery", "fn", "dataTable"], js_name = isDataTable)]
	pub(crate) fn is_data_table(table: &JsValue) -> Result<bool, JsValue>;
}

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(js_namespace = bootstrap)]
	pub(crate) type Modal;

	#[wasm_bindgen(constructor, catch, js_namespace = bootstrap)]
	pub(crate) fn new(element: &JsValue) -> Result<Modal, JsValue>;

	#[wasm_bindgen(method)]
	pub(crate) fn show(this: &Modal);
}

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(js_namespace = bootstrap)]
	pub(crate) type Tooltip;

	#[wasm_bindgen(constructor, catch, js_namespace = bootstrap)]
	pub(crate) fn new(element: &JsValue) -> Result<Tooltip, JsValue>;
}
