//! Searchable dropdowns
//!
//! Every select of the three families is enhanced with the select library
//! once it is available. Picking an option in a `.searchable-dropdown`
//! notifies the page's change callback and re-fires the pick as
//! `change.original` so plain change handlers keep working; location and
//! item selects only get the widget.

use std::collections::BTreeMap;
use std::time::Duration;

use loandesk_core::dom::{Dom, Selector};
use loandesk_core::{debug_log, info_log, warn_log};
use loandesk_widgets::{
	DestroyOutcome, GridLibrary, InitOutcome, OptionData, Poll, SelectFamily, SelectLibrary,
	select::ORIGINAL_CHANGE_EVENT,
};

use crate::callback::Callback;
use crate::events::{EventBinding, EventType, Handler};
use crate::host::Host;
use crate::runtime::{PageRuntime, Task};

/// A picked option, as passed to the change callback
#[derive(Debug, Clone, PartialEq)]
pub struct SelectChange<N> {
	pub select: N,
	pub option: OptionData,
}

/// Result of a dropdown initialization pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownInit {
	/// The library was present; this many selects were enhanced
	Initialized(usize),
	/// The library is not loaded yet; another pass is scheduled
	Retrying(Duration),
	/// The retry budget is spent; selects stay plain
	GaveUp,
}

impl<D, H, G, S> PageRuntime<D, H, G, S>
where
	D: Dom,
	H: Host<D::Node>,
	G: GridLibrary<D>,
	S: SelectLibrary<D>,
{
	/// Enhances the dropdowns if the select library is loaded, otherwise
	/// schedules a retry while the budget lasts
	pub fn init_dropdowns(&mut self) -> DropdownInit {
		match self.select_probe.check(self.select.is_available()) {
			Poll::Ready => DropdownInit::Initialized(self.initialize_dropdowns()),
			Poll::RetryAfter(delay) => {
				debug_log!("Select library not loaded, retrying in {:?}", delay);
				self.schedule(delay, Task::RetrySelects);
				DropdownInit::Retrying(delay)
			}
			Poll::GiveUp => {
				warn_log!("Select library not available, searchable dropdowns disabled");
				DropdownInit::GaveUp
			}
		}
	}

	/// (Re)creates the widget on every select of every family
	///
	/// Returns the number of selects enhanced.
	pub fn initialize_dropdowns(&mut self) -> usize {
		let mut enhanced = 0;
		for family in SelectFamily::ALL {
			for select in self.dom.select_all(&family.selector()) {
				let select = self.teardown_select(select);
				let options = family.options_for(&self.dom, &select);
				let outcome =
					self.widgets
						.initialize_select(&mut self.dom, &mut self.select, &select, &options);
				if outcome != InitOutcome::Initialized {
					continue;
				}
				enhanced += 1;
				if family == SelectFamily::Searchable {
					self.events.register_once(
						&mut self.dom,
						&select,
						EventBinding::new(EventType::SelectPicked, Handler::SelectPicked),
					);
				}
			}
		}
		info_log!("Searchable dropdowns initialized: {}", enhanced);
		enhanced
	}

	/// Tears down every dropdown widget, then recreates them
	pub fn refresh_dropdowns(&mut self) -> usize {
		for select in self.dom.select_all(&SelectFamily::any_selector()) {
			self.teardown_select(select);
		}
		self.initialize_dropdowns()
	}

	/// Appends an option to `select` and fires `change`
	///
	/// `data` is stored on the option and mirrored as `data-*` attributes,
	/// where the option templates read it.
	pub fn add_option(
		&mut self,
		select: &D::Node,
		value: &str,
		text: &str,
		data: &BTreeMap<String, String>,
	) -> D::Node {
		let option = self.dom.create_element("option");
		self.dom.set_attribute(&option, "value", value);
		self.dom.set_text_content(&option, text);
		for (key, item) in data {
			self.dom.set_attribute(&option, &format!("data-{key}"), item);
			self.dom
				.set_data(&option, key, serde_json::Value::String(item.clone()));
		}
		self.dom.append_child(select, &option);
		self.trigger(select, EventType::Change.as_str());
		option
	}

	/// Sets the callback told about every pick
	pub fn on_select_change(&mut self, callback: Callback<SelectChange<D::Node>>) {
		self.select_change = Some(callback);
	}

	pub(crate) fn on_select_picked(&mut self, select: &D::Node) {
		let value = self.dom.value(select);
		let option = self
			.dom
			.query_selector_all(select, &Selector::tag("option"))
			.iter()
			.map(|option| OptionData::from_element(&self.dom, option))
			.find(|option| option.id == value)
			.unwrap_or_else(|| OptionData::new(value, ""));
		if let Some(callback) = &self.select_change {
			callback.call(SelectChange {
				select: select.clone(),
				option,
			});
		}
		self.trigger(select, ORIGINAL_CHANGE_EVENT);
	}

	/// Destroys the widget on `select`, returning the node to keep using
	fn teardown_select(&mut self, select: D::Node) -> D::Node {
		match self
			.widgets
			.destroy_select(&mut self.dom, &mut self.select, &select)
		{
			DestroyOutcome::Recovered(replacement) => {
				self.events.prune(&self.dom);
				replacement
			}
			_ => select,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::events::{Dispatch, PageEvent};
	use crate::testing::{MockHost, TestRuntime, test_runtime};
	use loandesk_core::dom::{MemoryDom, NodeId, el};
	use rstest::{fixture, rstest};
	use std::sync::{Arc, Mutex};

	#[fixture]
	fn dropdown_page() -> (TestRuntime, NodeId) {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let select = dom.append(
			body,
			el("select")
				.id("branch")
				.class("searchable-dropdown")
				.child(el("option").attr("value", "").text(""))
				.child(
					el("option")
						.attr("value", "7")
						.attr("data-code", "BLR")
						.attr("data-description", "Indiranagar")
						.text("Bengaluru"),
				),
		);
		dom.append(body, el("select").class("item-dropdown"));
		dom.append(body, el("select").class("form-select"));
		(test_runtime(dom, MockHost::default()), select)
	}

	#[rstest]
	fn test_initializes_every_family(dropdown_page: (TestRuntime, NodeId)) {
		let (mut runtime, _) = dropdown_page;
		assert_eq!(runtime.init_dropdowns(), DropdownInit::Initialized(2));
		assert_eq!(runtime.select_library().live_instances(runtime.dom()), 2);
	}

	#[rstest]
	fn test_retry_once_then_give_up(dropdown_page: (TestRuntime, NodeId)) {
		let (mut runtime, _) = dropdown_page;
		runtime.select_library_mut().set_available(false);
		assert_eq!(
			runtime.init_dropdowns(),
			DropdownInit::Retrying(Duration::from_millis(500))
		);
		assert_eq!(runtime.advance(Duration::from_millis(500)), 1);
		assert!(runtime.pending_tasks().is_empty());
		assert_eq!(runtime.select_library().created(), 0);
	}

	#[rstest]
	fn test_late_library_picked_up_on_retry(dropdown_page: (TestRuntime, NodeId)) {
		let (mut runtime, _) = dropdown_page;
		runtime.select_library_mut().set_available(false);
		runtime.init_dropdowns();
		runtime.select_library_mut().set_available(true);
		runtime.advance(Duration::from_millis(500));
		assert_eq!(runtime.select_library().live_instances(runtime.dom()), 2);
	}

	#[rstest]
	fn test_refresh_keeps_one_widget(dropdown_page: (TestRuntime, NodeId)) {
		let (mut runtime, select) = dropdown_page;
		runtime.init_dropdowns();
		assert_eq!(runtime.refresh_dropdowns(), 2);
		assert_eq!(runtime.refresh_dropdowns(), 2);
		assert_eq!(runtime.select_library().live_instances(runtime.dom()), 2);
		let picks = runtime
			.events()
			.entries()
			.filter(|(node, binding)| **node == select && binding.event_type == EventType::SelectPicked)
			.count();
		assert_eq!(picks, 1);
	}

	#[rstest]
	fn test_pick_notifies_and_refires(dropdown_page: (TestRuntime, NodeId)) {
		let (mut runtime, select) = dropdown_page;
		runtime.init_dropdowns();

		let changes = Arc::new(Mutex::new(Vec::new()));
		runtime.on_select_change(Callback::new({
			let changes = Arc::clone(&changes);
			move |change: SelectChange<NodeId>| changes.lock().unwrap().push(change.option)
		}));
		let refired = Arc::new(Mutex::new(0));
		runtime.on(
			&select,
			ORIGINAL_CHANGE_EVENT,
			Callback::new({
				let refired = Arc::clone(&refired);
				move |_: PageEvent<NodeId>| *refired.lock().unwrap() += 1
			}),
		);

		runtime.dom_mut().set_value(&select, "7");
		assert_eq!(
			runtime.dispatch(PageEvent::new(EventType::SelectPicked, select)),
			Dispatch::Handled
		);
		let changes = changes.lock().unwrap();
		assert_eq!(changes.len(), 1);
		assert_eq!(changes[0].text, "Bengaluru");
		assert_eq!(changes[0].get("code"), Some("BLR"));
		assert_eq!(changes[0].get("description"), Some("Indiranagar"));
		assert_eq!(*refired.lock().unwrap(), 1);
		assert_eq!(
			runtime.host().fired(),
			&[(select, ORIGINAL_CHANGE_EVENT.to_string())]
		);
	}

	#[rstest]
	fn test_only_searchable_family_reports_picks(dropdown_page: (TestRuntime, NodeId)) {
		let (mut runtime, select) = dropdown_page;
		runtime.init_dropdowns();
		let item = runtime
			.dom()
			.select_all(&SelectFamily::Item.selector())
			.remove(0);
		let picks: Vec<NodeId> = runtime
			.events()
			.entries()
			.filter(|(_, binding)| binding.event_type == EventType::SelectPicked)
			.map(|(node, _)| *node)
			.collect();
		assert_eq!(picks, vec![select]);

		let changes = Arc::new(Mutex::new(0));
		runtime.on_select_change(Callback::new({
			let changes = Arc::clone(&changes);
			move |_: SelectChange<NodeId>| *changes.lock().unwrap() += 1
		}));
		runtime.dispatch(PageEvent::new(EventType::SelectPicked, item));
		assert_eq!(*changes.lock().unwrap(), 0);
		assert!(runtime.host().fired().is_empty());
	}

	#[rstest]
	fn test_add_option_fires_change(dropdown_page: (TestRuntime, NodeId)) {
		let (mut runtime, select) = dropdown_page;
		let changed = Arc::new(Mutex::new(0));
		runtime.on(
			&select,
			"change",
			Callback::new({
				let changed = Arc::clone(&changed);
				move |_: PageEvent<NodeId>| *changed.lock().unwrap() += 1
			}),
		);
		let data = BTreeMap::from([("code".to_string(), "MYS".to_string())]);
		let option = runtime.add_option(&select, "9", "Mysuru", &data);

		assert_eq!(runtime.dom().parent(&option), Some(select));
		assert_eq!(runtime.dom().attribute(&option, "data-code").as_deref(), Some("MYS"));
		assert_eq!(OptionData::from_element(runtime.dom(), &option).id, "9");
		assert_eq!(*changed.lock().unwrap(), 1);
	}
}
