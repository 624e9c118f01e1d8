//! One-time page bootstrap
//!
//! Runs after the document is ready and wires every piece of the page
//! together, in this order:
//!
//! 1. numeric and date fields, forms
//! 2. grids on generic tables, the summary grid, the customer grid
//! 3. the customer page hooks
//! 4. global error capture
//! 5. banner dismissal and tooltips
//! 6. entrance animations and button hover
//! 7. searchable dropdowns
//!
//! A second call does nothing.

use loandesk_core::dom::{Dom, Selector};
use loandesk_core::info_log;
use loandesk_forms::date_input::date_inputs;
use loandesk_forms::numeric_input::numeric_inputs;
use loandesk_widgets::{GridLibrary, InitOutcome, SelectLibrary};

use crate::customer::CustomerPageReport;
use crate::dropdowns::DropdownInit;
use crate::events::{EventBinding, EventType, Handler};
use crate::host::Host;
use crate::runtime::PageRuntime;
use crate::settings::{Settings, SettingsError};

/// Bindings made by [`PageRuntime::wire_forms`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormWiring {
	pub numeric_fields: usize,
	pub date_fields: usize,
	pub forms: usize,
}

/// Everything the bootstrap set up
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapReport {
	pub forms: FormWiring,
	/// Outcome per enhanced table id
	pub tables: Vec<(String, InitOutcome)>,
	pub customer_table: Option<InitOutcome>,
	pub customer_page: Option<CustomerPageReport>,
	pub alerts: usize,
	pub tooltips: usize,
	pub animated: usize,
	pub buttons: usize,
	pub dropdowns: DropdownInit,
}

impl<D, H, G, S> PageRuntime<D, H, G, S>
where
	D: Dom,
	H: Host<D::Node>,
	G: GridLibrary<D>,
	S: SelectLibrary<D>,
{
	/// Builds a runtime configured by the page's inline settings element
	pub fn from_page(dom: D, host: H, grid: G, select: S) -> Result<Self, SettingsError> {
		let settings = Settings::from_dom(&dom)?;
		settings.validate()?;
		Ok(Self::new(dom, host, grid, select, settings))
	}

	/// Binds the field validators and the submission guard
	///
	/// Safe to call again after new fields were added; existing bindings are
	/// not duplicated.
	pub fn wire_forms(&mut self) -> FormWiring {
		let numeric = self.dom.select_all(&numeric_inputs());
		for field in &numeric {
			self.bind(field, EventType::Blur, Handler::ValidateNumeric);
			self.bind(field, EventType::Input, Handler::NumericInput);
		}
		let dates = self.dom.select_all(&date_inputs());
		for field in &dates {
			self.bind(field, EventType::Change, Handler::ValidateDate);
		}
		let forms = self.dom.select_all(&Selector::tag("form"));
		for form in &forms {
			self.bind(form, EventType::Submit, Handler::GuardSubmit);
		}
		FormWiring {
			numeric_fields: numeric.len(),
			date_fields: dates.len(),
			forms: forms.len(),
		}
	}

	/// Runs the bootstrap sequence; `None` if it already ran
	pub fn bootstrap(&mut self) -> Option<BootstrapReport> {
		if self.bootstrapped {
			return None;
		}
		self.bootstrapped = true;
		info_log!("Loan Management System initialized");

		let forms = self.wire_forms();
		let tables = self.init_tables();
		let customer_table = self.init_customer_table();
		let customer_page = self.init_customer_page();
		self.errors.install();
		let alerts = self.schedule_alert_dismissal();
		let tooltips = self.init_tooltips();
		let animated = self.animate_entrances();
		let buttons = self.bind_button_hover();
		let dropdowns = self.init_dropdowns();

		let report = BootstrapReport {
			forms,
			tables,
			customer_table,
			customer_page,
			alerts,
			tooltips,
			animated,
			buttons,
			dropdowns,
		};
		info_log!(
			"Bootstrap complete: {} forms, {} tables, {} pending tasks",
			report.forms.forms,
			report.tables.len(),
			self.timers.len()
		);
		Some(report)
	}

	fn bind(&mut self, node: &D::Node, event_type: EventType, handler: Handler<D::Node>) {
		self.events
			.register_once(&mut self.dom, node, EventBinding::new(event_type, handler));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{MockHost, test_runtime};
	use loandesk_core::dom::{MemoryDom, el};
	use rstest::rstest;

	#[rstest]
	fn test_wire_forms_is_idempotent() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		dom.append(
			body,
			el("form")
				.child(el("input").attr("type", "number"))
				.child(el("input").attr("type", "date"))
				.child(el("input").attr("type", "text")),
		);
		let mut runtime = test_runtime(dom, MockHost::default());
		let wiring = runtime.wire_forms();
		assert_eq!(
			wiring,
			FormWiring {
				numeric_fields: 1,
				date_fields: 1,
				forms: 1
			}
		);
		assert_eq!(runtime.events().len(), 4);
		runtime.wire_forms();
		assert_eq!(runtime.events().len(), 4);
	}

	#[rstest]
	fn test_bootstrap_runs_once() {
		let mut runtime = test_runtime(MemoryDom::new(), MockHost::default());
		let report = runtime.bootstrap().unwrap();
		assert_eq!(report.dropdowns, DropdownInit::Initialized(0));
		assert!(runtime.errors().is_installed());
		assert!(runtime.is_bootstrapped());
		assert_eq!(runtime.bootstrap(), None);
	}

	#[rstest]
	fn test_from_page_reads_inline_settings() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		dom.append(
			body,
			el("script")
				.id(crate::settings::SETTINGS_ELEMENT_ID)
				.attr("type", "application/json")
				.text(r#"{"timing": {"submit_reset_ms": 3000}}"#),
		);
		let runtime: crate::testing::TestRuntime = PageRuntime::from_page(
			dom,
			MockHost::default(),
			Default::default(),
			Default::default(),
		)
		.unwrap();
		assert_eq!(runtime.settings().timing.submit_reset_ms, 3000);
		assert_eq!(runtime.settings().tables.default_page_length, 10);
	}

	#[rstest]
	fn test_from_page_rejects_bad_settings() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		dom.append(
			body,
			el("script")
				.id(crate::settings::SETTINGS_ELEMENT_ID)
				.text(r#"{"tables": {"default_page_length": 0}}"#),
		);
		let result: Result<crate::testing::TestRuntime, _> = PageRuntime::from_page(
			dom,
			MockHost::default(),
			Default::default(),
			Default::default(),
		);
		assert!(matches!(result, Err(SettingsError::ValidationError(_))));
	}
}
