//! Entry point, event forwarding and the exported page objects
//!
//! The runtime lives in a thread-local slot. Every entry (a DOM event, a
//! timer tick, a call from another script) first moves the runtime clock
//! up to real time, which runs whatever fell due, and afterwards re-arms a
//! single timeout for the next pending task.
//!
//! Calls made while the runtime is busy, for example from a callback the
//! runtime itself is running, are dropped with a warning.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::Duration;

use js_sys::{Date, Function};
use loandesk_core::numeric::RawValue;
use loandesk_core::{debug_log, info_log, warn_log};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, ErrorEvent, Event, PromiseRejectionEvent, Window};

use super::dom::WebDom;
use super::host::BrowserHost;
use super::js::{describe, from_js, to_js};
use super::libraries::{WebGridLibrary, WebSelectLibrary};
use crate::callback::Callback;
use crate::dropdowns::SelectChange;
use crate::errors::{ErrorDisposition, UncaughtError};
use crate::events::{Dispatch, EventType, PageEvent};
use crate::exports::UtilsApi;
use crate::runtime::PageRuntime;
use crate::settings::Settings;

/// The runtime bound to the browser
pub type WebRuntime = PageRuntime<WebDom, BrowserHost, WebGridLibrary, WebSelectLibrary>;

thread_local! {
	static RUNTIME: RefCell<Option<WebRuntime>> = const { RefCell::new(None) };
	/// `Date.now()` at the last clock sync
	static LAST_SYNC: Cell<f64> = const { Cell::new(0.0) };
	static PUMP: Cell<Option<i32>> = const { Cell::new(None) };
}

/// Runs `f` against the installed runtime; `None` before [`start`] or
/// while the runtime is busy
fn with_runtime<R>(f: impl FnOnce(&mut WebRuntime) -> R) -> Option<R> {
	let (result, due_in) = RUNTIME.with(|slot| {
		let Ok(mut slot) = slot.try_borrow_mut() else {
			warn_log!("Page runtime is busy; call dropped");
			return None;
		};
		let runtime = slot.as_mut()?;
		sync_clock(runtime);
		let result = f(runtime);
		Some((result, runtime.next_due_in()))
	})?;
	arm_pump(due_in);
	Some(result)
}

fn sync_clock(runtime: &mut WebRuntime) {
	let now = Date::now();
	let last = LAST_SYNC.replace(now);
	if last > 0.0 && now > last {
		let ran = runtime.advance(Duration::from_secs_f64((now - last) / 1000.0));
		if ran > 0 {
			debug_log!("Ran {} timed task(s)", ran);
		}
	}
}

/// Re-arms the single timeout that wakes the runtime for its next task
fn arm_pump(due_in: Option<Duration>) {
	let Some(window) = web_sys::window() else {
		return;
	};
	if let Some(handle) = PUMP.take() {
		window.clear_timeout_with_handle(handle);
	}
	let Some(delay) = due_in else {
		return;
	};
	let tick = Closure::once_into_js(|| {
		PUMP.set(None);
		with_runtime(|_| ());
	});
	let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
	match window.set_timeout_with_callback_and_timeout_and_arguments_0(tick.unchecked_ref(), millis) {
		Ok(handle) => PUMP.set(Some(handle)),
		Err(err) => warn_log!("Timer could not be armed: {}", describe(&err)),
	}
}

/// Delivers a searchable select pick
pub(crate) fn forward_pick(select: Element) {
	with_runtime(|runtime| runtime.dispatch(PageEvent::new(EventType::SelectPicked, select)));
}

fn bubbles(kind: EventType) -> bool {
	matches!(
		kind,
		EventType::Input | EventType::Change | EventType::Submit | EventType::Click
	)
}

/// Dispatches a captured DOM event to its target, and to the target's
/// ancestors for bubbling types
fn route(kind: EventType, event: &Event) {
	let Some(target) = event.target().and_then(|target| target.dyn_into::<Element>().ok()) else {
		return;
	};
	let path: Vec<Element> = if bubbles(kind) {
		std::iter::successors(Some(target), |node| node.parent_element()).collect()
	} else {
		vec![target]
	};
	let result = with_runtime(|runtime| {
		path.into_iter().fold(Dispatch::Ignored, |result, node| {
			result.merge(runtime.dispatch(PageEvent::new(kind, node)))
		})
	});
	if result.is_some_and(|result| result.default_prevented()) {
		event.prevent_default();
	}
}

/// One capture-phase listener per event type on the document
fn listen_document(document: &Document) {
	for kind in EventType::ALL {
		// Delivered through the select plugin's own jQuery event
		if kind == EventType::SelectPicked {
			continue;
		}
		let closure = Closure::wrap(Box::new(move |event: Event| route(kind, &event)) as Box<dyn FnMut(_)>);
		document
			.add_event_listener_with_callback_and_bool(kind.as_str(), closure.as_ref().unchecked_ref(), true)
			.expect("Failed to add document listener");
		closure.forget(); // Keep closure alive
	}
}

fn listen_errors(window: &Window) {
	let on_error = Closure::wrap(Box::new(|event: Event| {
		let Some(event) = event.dyn_ref::<ErrorEvent>() else {
			return;
		};
		let error = UncaughtError::Script {
			message: event.message(),
			filename: event.filename(),
			line: event.lineno(),
			column: event.colno(),
		};
		if with_runtime(|runtime| runtime.report_error(error)) == Some(ErrorDisposition::Suppressed) {
			event.prevent_default();
		}
	}) as Box<dyn FnMut(_)>);
	window
		.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())
		.expect("Failed to add error listener");
	on_error.forget();

	let on_rejection = Closure::wrap(Box::new(|event: Event| {
		let Some(event) = event.dyn_ref::<PromiseRejectionEvent>() else {
			return;
		};
		let reason = describe(&event.reason());
		if with_runtime(|runtime| runtime.report_rejection(reason)) == Some(ErrorDisposition::Suppressed) {
			event.prevent_default();
		}
	}) as Box<dyn FnMut(_)>);
	window
		.add_event_listener_with_callback("unhandledrejection", on_rejection.as_ref().unchecked_ref())
		.expect("Failed to add rejection listener");
	on_rejection.forget();
}

fn run_bootstrap() {
	match with_runtime(|runtime| runtime.bootstrap()) {
		Some(Some(report)) => debug_log!("Bootstrap report: {:?}", report),
		Some(None) => debug_log!("Page already bootstrapped"),
		None => warn_log!("Page runtime unavailable; bootstrap skipped"),
	}
}

/// Installs the runtime and bootstraps the page once the document is ready
#[wasm_bindgen(start)]
pub fn start() {
	#[cfg(feature = "console_error_panic_hook")]
	console_error_panic_hook::set_once();

	let (Some(window), Some(dom), Some(host)) = (
		web_sys::window(),
		WebDom::from_window(),
		BrowserHost::from_window(),
	) else {
		warn_log!("No browsing context; page runtime not started");
		return;
	};
	let document = dom.document().clone();

	let settings = match Settings::from_dom(&dom).and_then(|settings| settings.validate().map(|()| settings)) {
		Ok(settings) => settings,
		Err(err) => {
			warn_log!("Page settings rejected, using defaults: {}", err);
			Settings::default()
		}
	};
	let grid = WebGridLibrary::new(settings.number_format());
	let runtime = PageRuntime::new(dom, host, grid, WebSelectLibrary, settings);
	RUNTIME.with(|slot| *slot.borrow_mut() = Some(runtime));
	LAST_SYNC.set(Date::now());

	listen_document(&document);
	listen_errors(&window);

	if document.ready_state() == "loading" {
		let on_ready = Closure::once_into_js(run_bootstrap);
		document
			.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
			.expect("Failed to add DOMContentLoaded listener");
	} else {
		run_bootstrap();
	}
	info_log!("Page runtime started");
}

/// Runs `f` on a loose JavaScript value read as a raw number input
fn with_raw<R>(value: &JsValue, f: impl FnOnce(RawValue<'_>) -> R) -> R {
	if let Some(number) = value.as_f64() {
		return f(RawValue::Number(number));
	}
	if let Some(flag) = value.as_bool() {
		return f(RawValue::Bool(flag));
	}
	match value.as_string() {
		Some(text) => f(RawValue::from(&text)),
		None => f(RawValue::Missing),
	}
}

/// String entries of a plain object, for `data-*` attributes
fn string_map(value: &JsValue) -> BTreeMap<String, String> {
	let Some(serde_json::Value::Object(map)) = from_js(value) else {
		return BTreeMap::new();
	};
	map.into_iter()
		.map(|(key, value)| match value {
			serde_json::Value::String(text) => (key, text),
			other => (key, other.to_string()),
		})
		.collect()
}

/// `window.LoanApp`: utilities and the form and table entry points
#[wasm_bindgen]
pub struct LoanApp {
	utils: UtilsApi,
}

#[wasm_bindgen]
impl LoanApp {
	#[wasm_bindgen(constructor)]
	pub fn new() -> LoanApp {
		let format = with_runtime(|runtime| runtime.number_format().clone()).unwrap_or_default();
		LoanApp {
			utils: UtilsApi::new(format),
		}
	}

	/// The active settings as a plain object
	pub fn config(&self) -> JsValue {
		with_runtime(|runtime| serde_json::to_value(runtime.settings()).ok())
			.flatten()
			.map(|settings| to_js(&settings))
			.unwrap_or(JsValue::NULL)
	}

	#[wasm_bindgen(js_name = safeNumber)]
	pub fn safe_number(&self, value: JsValue, default: Option<f64>) -> f64 {
		with_raw(&value, |raw| self.utils.safe_number(raw, default.unwrap_or(0.0)))
	}

	#[wasm_bindgen(js_name = formatCurrency)]
	pub fn format_currency(&self, value: JsValue) -> String {
		with_raw(&value, |raw| self.utils.format_currency(raw))
	}

	#[wasm_bindgen(js_name = formatPercentage)]
	pub fn format_percentage(&self, value: JsValue) -> String {
		with_raw(&value, |raw| self.utils.format_percentage(raw))
	}

	#[wasm_bindgen(js_name = calculateDays)]
	pub fn calculate_days(&self, from: &str, to: &str) -> f64 {
		self.utils.calculate_days(from, to) as f64
	}

	#[wasm_bindgen(js_name = initForms)]
	pub fn init_forms(&self) -> usize {
		with_runtime(|runtime| {
			let wiring = runtime.loan_app().forms().init();
			wiring.numeric_fields + wiring.date_fields + wiring.forms
		})
		.unwrap_or(0)
	}

	#[wasm_bindgen(js_name = validateNumericInput)]
	pub fn validate_numeric_input(&self, field: &Element) -> bool {
		with_runtime(|runtime| runtime.loan_app().forms().validate_numeric_input(field).is_valid())
			.unwrap_or(false)
	}

	#[wasm_bindgen(js_name = validateDateInput)]
	pub fn validate_date_input(&self, field: &Element) -> bool {
		with_runtime(|runtime| runtime.loan_app().forms().validate_date_input(field).is_valid())
			.unwrap_or(false)
	}

	#[wasm_bindgen(js_name = updateCalculations)]
	pub fn update_calculations(&self, field: &Element) {
		with_runtime(|runtime| runtime.loan_app().forms().update_calculations(field));
	}

	/// `false` when the submission must be cancelled
	#[wasm_bindgen(js_name = handleSubmission)]
	pub fn handle_submission(&self, form: &Element) -> bool {
		with_runtime(|runtime| !runtime.loan_app().forms().handle_submission(form).default_prevented())
			.unwrap_or(true)
	}

	#[wasm_bindgen(js_name = completeSubmission)]
	pub fn complete_submission(&self, form: &Element) -> bool {
		with_runtime(|runtime| runtime.loan_app().forms().complete_submission(form)).unwrap_or(false)
	}

	/// Number of tables enhanced
	#[wasm_bindgen(js_name = initTables)]
	pub fn init_tables(&self) -> usize {
		with_runtime(|runtime| runtime.loan_app().tables().init().len()).unwrap_or(0)
	}

	#[wasm_bindgen(js_name = initCustomerSummaryTable)]
	pub fn init_customer_summary_table(&self) -> bool {
		with_runtime(|runtime| runtime.loan_app().tables().init_customer_summary_table().is_some())
			.unwrap_or(false)
	}

	#[wasm_bindgen(js_name = initCustomerTable)]
	pub fn init_customer_table(&self) -> bool {
		with_runtime(|runtime| runtime.loan_app().tables().init_customer_table().is_some())
			.unwrap_or(false)
	}

	/// Completion signal: the container's rows are in place
	#[wasm_bindgen(js_name = tableSettled)]
	pub fn table_settled(&self, container_id: &str) -> bool {
		with_runtime(|runtime| runtime.loan_app().tables().settled(container_id).is_some())
			.unwrap_or(false)
	}

	#[wasm_bindgen(js_name = destroyTable)]
	pub fn destroy_table(&self, id: &str) -> bool {
		with_runtime(|runtime| runtime.loan_app().tables().destroy(id)).unwrap_or(false)
	}

	/// Binds `handler(event)` to `event` (`type` or `type.namespace`) on
	/// `node`
	pub fn on(&self, node: &Element, event: &str, handler: Function) -> bool {
		let callback = Callback::new(move |fired: PageEvent<Element>| {
			if let Err(err) = handler.call1(&JsValue::NULL, &fired.target) {
				warn_log!("Page handler failed: {}", describe(&err));
			}
		});
		with_runtime(|runtime| runtime.on(node, event, callback)).unwrap_or(false)
	}
}

impl Default for LoanApp {
	fn default() -> Self {
		Self::new()
	}
}

/// `window.SearchableDropdown`
#[wasm_bindgen]
pub struct SearchableDropdown {
	_private: (),
}

#[wasm_bindgen]
impl SearchableDropdown {
	#[wasm_bindgen(constructor)]
	pub fn new() -> SearchableDropdown {
		SearchableDropdown { _private: () }
	}

	/// Re-creates every searchable select; returns how many are bound
	pub fn refresh(&self) -> usize {
		with_runtime(|runtime| runtime.searchable_dropdown().refresh()).unwrap_or(0)
	}

	pub fn initialize(&self) -> usize {
		with_runtime(|runtime| runtime.searchable_dropdown().initialize()).unwrap_or(0)
	}

	/// Appends an option carrying `data` as `data-*` attributes
	#[wasm_bindgen(js_name = addOption)]
	pub fn add_option(&self, select: &Element, value: &str, text: &str, data: JsValue) -> Option<Element> {
		let data = string_map(&data);
		with_runtime(|runtime| runtime.searchable_dropdown().add_option(select, value, text, &data))
	}

	/// Calls `handler(select, {id, text, data})` after every pick
	#[wasm_bindgen(js_name = onChange)]
	pub fn on_change(&self, handler: Function) {
		let callback = Callback::new(move |change: SelectChange<Element>| {
			let option = serde_json::json!({
				"id": change.option.id,
				"text": change.option.text,
				"data": change.option.data,
			});
			if let Err(err) = handler.call2(&JsValue::NULL, &change.select, &to_js(&option)) {
				warn_log!("Dropdown change handler failed: {}", describe(&err));
			}
		});
		with_runtime(|runtime| runtime.on_select_change(callback));
	}
}

impl Default for SearchableDropdown {
	fn default() -> Self {
		Self::new()
	}
}
