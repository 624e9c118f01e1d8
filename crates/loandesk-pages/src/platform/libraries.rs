//! The jQuery grid and select plugins behind the widget traits

use js_sys::{Array, Function, Reflect};
use loandesk_core::dom::Dom;
use loandesk_core::numeric::{NumberFormat, RawValue};
use loandesk_widgets::grid::{CellValue, RenderKind};
use loandesk_widgets::select::{Markup, OptionData, SELECT_EVENT, SELECT_EVENT_NAMESPACE};
use loandesk_widgets::{
	CellRenderer, DropdownParent, GridLibrary, GridOptions, SelectLibrary, SelectOptions,
	WidgetError, WidgetResult,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

use super::dom::WebDom;
use super::js::{describe, from_js, global_path, is_data_table, jquery, to_js};

fn element_label(element: &Element) -> String {
	match element.id() {
		id if !id.is_empty() => format!("#{id}"),
		_ => element.tag_name().to_ascii_lowercase(),
	}
}

fn create_failed(element: &Element, err: &JsValue) -> WidgetError {
	WidgetError::CreateFailed {
		target: element_label(element),
		reason: describe(err),
	}
}

fn destroy_failed(element: &Element, err: &JsValue) -> WidgetError {
	WidgetError::DestroyFailed {
		target: element_label(element),
		reason: describe(err),
	}
}

/// `render` callback of a formatted column
fn render_function(renderer: CellRenderer, format: NumberFormat) -> Function {
	let closure = Closure::wrap(Box::new(move |data: JsValue, kind: JsValue| -> JsValue {
		let text = data.as_string();
		let raw = match (&text, data.as_f64()) {
			(Some(text), _) => RawValue::from(text),
			(None, Some(number)) => RawValue::from(number),
			(None, None) => RawValue::Missing,
		};
		let kind = RenderKind::parse(&kind.as_string().unwrap_or_default());
		match renderer.render(&format, raw, kind) {
			CellValue::Text(text) => JsValue::from_str(&text),
			CellValue::Number(number) => JsValue::from_f64(number),
		}
	}) as Box<dyn Fn(JsValue, JsValue) -> JsValue>);
	let function: Function = closure.as_ref().unchecked_ref::<Function>().clone();
	closure.forget(); // Lives as long as the column definition
	function
}

/// Grid plugin (`$.fn.DataTable`)
#[derive(Debug, Clone, Default)]
pub struct WebGridLibrary {
	format: NumberFormat,
}

impl WebGridLibrary {
	pub fn new(format: NumberFormat) -> Self {
		Self { format }
	}

	/// Option object with the formatted columns' render callbacks attached
	fn options_object(&self, options: &GridOptions) -> JsValue {
		let object = to_js(&options.to_json());
		let defs = Reflect::get(&object, &JsValue::from_str("columnDefs"))
			.ok()
			.filter(Array::is_array)
			.map(|defs| Array::from(&defs));
		if let Some(defs) = defs {
			for (i, def) in options.column_defs.iter().enumerate() {
				let Some(renderer) = def.renderer else {
					continue;
				};
				let render = render_function(renderer, self.format.clone());
				let _ = Reflect::set(&defs.get(i as u32), &JsValue::from_str("render"), &render);
			}
		}
		object
	}
}

impl GridLibrary<WebDom> for WebGridLibrary {
	fn is_available(&self) -> bool {
		global_path(&["jQuery", "fn", "DataTable"]).is_some()
	}

	fn is_installed(&self, _dom: &WebDom, table: &Element) -> bool {
		is_data_table(table).unwrap_or(false)
	}

	fn create(&mut self, _dom: &mut WebDom, table: &Element, options: &GridOptions) -> WidgetResult<()> {
		let options = self.options_object(options);
		jquery(table)
			.and_then(|node| node.data_table(&options))
			.map(drop)
			.map_err(|err| create_failed(table, &err))
	}

	fn clear_and_draw(&mut self, _dom: &mut WebDom, table: &Element) -> WidgetResult<()> {
		jquery(table)
			.and_then(|node| node.data_table_api())
			.and_then(|api| api.clear())
			.and_then(|api| api.draw())
			.map(drop)
			.map_err(|err| destroy_failed(table, &err))
	}

	fn destroy(&mut self, _dom: &mut WebDom, table: &Element, remove_from_dom: bool) -> WidgetResult<()> {
		jquery(table)
			.and_then(|node| node.data_table_api())
			.and_then(|api| api.destroy(remove_from_dom))
			.map(drop)
			.map_err(|err| destroy_failed(table, &err))
	}
}

/// Select plugin (`$.fn.select2`)
#[derive(Debug, Clone, Default)]
pub struct WebSelectLibrary;

/// `{id, text, element}` item the plugin hands to templates, as option data
fn option_data(item: &JsValue) -> OptionData {
	let field = |key: &str| {
		Reflect::get(item, &JsValue::from_str(key))
			.ok()
			.and_then(|value| value.as_string())
			.unwrap_or_default()
	};
	let mut option = OptionData::new(field("id"), field("text"));
	let element = Reflect::get(item, &JsValue::from_str("element"))
		.ok()
		.and_then(|element| element.dyn_into::<HtmlElement>().ok());
	if let Some(element) = element
		&& let Some(serde_json::Value::Object(map)) = from_js(&element.dataset())
	{
		for (key, value) in map {
			if let serde_json::Value::String(value) = value {
				option.data.insert(key, value);
			}
		}
	}
	option
}

/// Template callback; plain text is escaped by the plugin, markup is
/// handed over as parsed elements
fn template_function(render: impl Fn(&OptionData) -> Markup + 'static) -> Function {
	let closure = Closure::wrap(Box::new(move |item: JsValue| -> JsValue {
		match render(&option_data(&item)) {
			Markup::Text(text) => JsValue::from_str(&text),
			Markup::Html(html) => jquery(&JsValue::from_str(&html))
				.map(JsValue::from)
				.unwrap_or_else(|_| JsValue::from_str(&html)),
		}
	}) as Box<dyn Fn(JsValue) -> JsValue>);
	let function: Function = closure.as_ref().unchecked_ref::<Function>().clone();
	closure.forget();
	function
}

fn pick_forwarder() -> Function {
	let closure = Closure::wrap(Box::new(move |event: JsValue| {
		let target = Reflect::get(&event, &JsValue::from_str("currentTarget"))
			.ok()
			.and_then(|target| target.dyn_into::<Element>().ok());
		if let Some(select) = target {
			super::app::forward_pick(select);
		}
	}) as Box<dyn Fn(JsValue)>);
	let function: Function = closure.as_ref().unchecked_ref::<Function>().clone();
	closure.forget();
	function
}

impl WebSelectLibrary {
	fn options_object(options: &SelectOptions<Element>) -> JsValue {
		let object = to_js(&options.to_json());
		let template = options.template;
		let set = |key: &str, value: JsValue| {
			let _ = Reflect::set(&object, &JsValue::from_str(key), &value);
		};
		set(
			"templateResult",
			template_function(move |option| template.result(option)).into(),
		);
		set(
			"templateSelection",
			template_function(move |option| template.selection(option)).into(),
		);
		if let DropdownParent::Dialog(modal) = &options.dropdown_parent
			&& let Ok(parent) = jquery(modal)
		{
			set("dropdownParent", parent.into());
		}
		object
	}
}

impl SelectLibrary<WebDom> for WebSelectLibrary {
	fn is_available(&self) -> bool {
		global_path(&["jQuery", "fn", "select2"]).is_some()
	}

	fn is_installed(&self, _dom: &WebDom, select: &Element) -> bool {
		jquery(select)
			.and_then(|node| node.has_class("select2-hidden-accessible"))
			.unwrap_or(false)
	}

	fn create(
		&mut self,
		dom: &mut WebDom,
		select: &Element,
		options: &SelectOptions<Element>,
	) -> WidgetResult<()> {
		let object = Self::options_object(options);
		let node = jquery(select).map_err(|err| create_failed(select, &err))?;
		node.select2(&object)
			.map_err(|err| create_failed(select, &err))?;
		let event = format!("{SELECT_EVENT}.{SELECT_EVENT_NAMESPACE}");
		node.on(&event, &pick_forwarder())
			.map_err(|err| create_failed(select, &err))?;
		dom.add_listener(select, &event);
		Ok(())
	}

	fn destroy(&mut self, _dom: &mut WebDom, select: &Element) -> WidgetResult<()> {
		jquery(select)
			.and_then(|node| node.select2_command("destroy"))
			.map(drop)
			.map_err(|err| destroy_failed(select, &err))
	}
}
