//! Entrance animations and button hover lift
//!
//! Cards fade in one after another, tables follow after a fixed offset.
//! Each element is hidden immediately and revealed by a [`Task::Reveal`]
//! once its stagger delay has passed; the CSS transition does the fading.

use std::time::Duration;

use loandesk_core::dom::{Dom, Selector};
use loandesk_core::patch::DomPatch;
use loandesk_widgets::{GridLibrary, SelectLibrary};

use crate::events::{EventBinding, EventType, Handler};
use crate::host::Host;
use crate::runtime::{PageRuntime, Task};
use crate::settings::TimingSettings;

/// Class added while the pointer is over a button
pub const HOVER_CLASS: &str = "shadow-sm";

pub fn hidden_patches() -> Vec<DomPatch> {
	vec![
		DomPatch::set_style("opacity", "0"),
		DomPatch::set_style("transform", "translateY(20px)"),
	]
}

pub fn revealed_patches(duration: Duration) -> Vec<DomPatch> {
	let ms = duration.as_millis();
	vec![
		DomPatch::set_style(
			"transition",
			format!("opacity {ms}ms ease, transform {ms}ms ease"),
		),
		DomPatch::set_style("opacity", "1"),
		DomPatch::set_style("transform", "translateY(0)"),
	]
}

pub fn hover_lift_patches() -> Vec<DomPatch> {
	vec![
		DomPatch::add_class(HOVER_CLASS),
		DomPatch::set_style("transform", "translateY(-1px)"),
	]
}

pub fn hover_drop_patches() -> Vec<DomPatch> {
	vec![
		DomPatch::remove_class(HOVER_CLASS),
		DomPatch::set_style("transform", "translateY(0)"),
	]
}

/// Reveal delay of every card and table, in document order per group
pub fn plan_entrances<D: Dom + ?Sized>(
	dom: &D,
	timing: &TimingSettings,
) -> Vec<(D::Node, Duration)> {
	let stagger = Duration::from_millis(timing.card_stagger_ms);
	let table_offset = Duration::from_millis(timing.table_stagger_offset_ms);

	let cards = dom.select_all(&Selector::class("card"));
	let tables = dom.select_all(&Selector::class("table"));
	let card_delays = cards
		.into_iter()
		.enumerate()
		.map(|(i, card)| (card, stagger * i as u32));
	let table_delays = tables
		.into_iter()
		.enumerate()
		.map(|(i, table)| (table, table_offset + stagger * i as u32));
	card_delays.chain(table_delays).collect()
}

impl<D, H, G, S> PageRuntime<D, H, G, S>
where
	D: Dom,
	H: Host<D::Node>,
	G: GridLibrary<D>,
	S: SelectLibrary<D>,
{
	/// Hides cards and tables and schedules their reveal; returns how many
	/// elements animate
	pub fn animate_entrances(&mut self) -> usize {
		let plan = plan_entrances(&self.dom, &self.settings.timing);
		for (node, delay) in &plan {
			self.apply(node, &hidden_patches());
			self.schedule(*delay, Task::Reveal(node.clone()));
		}
		plan.len()
	}

	/// Binds the hover lift to every `.btn`; returns how many buttons
	pub fn bind_button_hover(&mut self) -> usize {
		let buttons = self.dom.select_all(&Selector::class("btn"));
		for button in &buttons {
			self.events.register_once(
				&mut self.dom,
				button,
				EventBinding::new(EventType::MouseEnter, Handler::HoverLift),
			);
			self.events.register_once(
				&mut self.dom,
				button,
				EventBinding::new(EventType::MouseLeave, Handler::HoverDrop),
			);
		}
		buttons.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::events::PageEvent;
	use crate::testing::{MockHost, test_runtime};
	use loandesk_core::dom::{MemoryDom, el};
	use rstest::rstest;

	#[rstest]
	fn test_plan_staggers_cards_then_tables() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let first = dom.append(body, el("div").class("card"));
		let second = dom.append(body, el("div").class("card"));
		let table = dom.append(body, el("table").class("table"));

		let plan = plan_entrances(&dom, &TimingSettings::default());
		assert_eq!(
			plan,
			vec![
				(first, Duration::ZERO),
				(second, Duration::from_millis(100)),
				(table, Duration::from_millis(200)),
			]
		);
	}

	#[rstest]
	fn test_reveal_after_delay() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		dom.append(body, el("div").class("card"));
		let late = dom.append(body, el("div").class("card"));
		let mut runtime = test_runtime(dom, MockHost::default());

		assert_eq!(runtime.animate_entrances(), 2);
		assert_eq!(runtime.dom().style(&late, "opacity").as_deref(), Some("0"));
		runtime.advance(Duration::from_millis(99));
		assert_eq!(runtime.dom().style(&late, "opacity").as_deref(), Some("0"));
		runtime.advance(Duration::from_millis(1));
		assert_eq!(runtime.dom().style(&late, "opacity").as_deref(), Some("1"));
		assert_eq!(
			runtime.dom().style(&late, "transform").as_deref(),
			Some("translateY(0)")
		);
	}

	#[rstest]
	fn test_hover_lift() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let button = dom.append(body, el("button").class("btn"));
		let mut runtime = test_runtime(dom, MockHost::default());
		assert_eq!(runtime.bind_button_hover(), 1);
		assert_eq!(runtime.bind_button_hover(), 1);
		assert_eq!(runtime.events().len(), 2);

		runtime.dispatch(PageEvent::new(EventType::MouseEnter, button));
		assert!(runtime.dom().has_class(&button, HOVER_CLASS));
		assert_eq!(
			runtime.dom().style(&button, "transform").as_deref(),
			Some("translateY(-1px)")
		);
		runtime.dispatch(PageEvent::new(EventType::MouseLeave, button));
		assert!(!runtime.dom().has_class(&button, HOVER_CLASS));
	}
}
