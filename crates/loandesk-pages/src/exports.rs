//! API surfaces for other page scripts
//!
//! [`LoanAppApi`] groups the application helpers in three namespaces
//! (`utils`, `forms`, `tables`); [`SearchableDropdownApi`] exposes the
//! dropdown helpers. Both are borrowed views over a [`PageRuntime`], so
//! there is no global state behind them. On wasm32 the platform adapter
//! exports them to JavaScript under the same names.

use std::collections::BTreeMap;

use loandesk_core::dates::calculate_days;
use loandesk_core::dom::Dom;
use loandesk_core::numeric::{NumberFormat, RawValue, safe_number};
use loandesk_forms::FieldState;
use loandesk_widgets::{GridLibrary, InitOutcome, SelectLibrary};

use crate::bootstrap::FormWiring;
use crate::events::Dispatch;
use crate::host::Host;
use crate::runtime::PageRuntime;
use crate::settings::Settings;

/// Formatting helpers bound to the page's number format
#[derive(Debug, Clone, PartialEq)]
pub struct UtilsApi {
	format: NumberFormat,
}

impl UtilsApi {
	pub fn new(format: NumberFormat) -> Self {
		Self { format }
	}

	pub fn safe_number<'a>(&self, value: impl Into<RawValue<'a>>, default: f64) -> f64 {
		safe_number(value, default)
	}

	pub fn format_currency<'a>(&self, value: impl Into<RawValue<'a>>) -> String {
		self.format.currency(value)
	}

	pub fn format_percentage<'a>(&self, value: impl Into<RawValue<'a>>) -> String {
		self.format.percentage(value)
	}

	pub fn calculate_days(&self, from: &str, to: &str) -> i64 {
		calculate_days(from, to)
	}
}

/// Application helpers
pub struct LoanAppApi<'a, D: Dom, H, G, S> {
	runtime: &'a mut PageRuntime<D, H, G, S>,
}

/// Field and form helpers
pub struct FormsApi<'a, D: Dom, H, G, S> {
	runtime: &'a mut PageRuntime<D, H, G, S>,
}

/// Grid helpers
pub struct TablesApi<'a, D: Dom, H, G, S> {
	runtime: &'a mut PageRuntime<D, H, G, S>,
}

/// Searchable dropdown helpers
pub struct SearchableDropdownApi<'a, D: Dom, H, G, S> {
	runtime: &'a mut PageRuntime<D, H, G, S>,
}

impl<D, H, G, S> PageRuntime<D, H, G, S>
where
	D: Dom,
	H: Host<D::Node>,
	G: GridLibrary<D>,
	S: SelectLibrary<D>,
{
	pub fn loan_app(&mut self) -> LoanAppApi<'_, D, H, G, S> {
		LoanAppApi { runtime: self }
	}

	pub fn searchable_dropdown(&mut self) -> SearchableDropdownApi<'_, D, H, G, S> {
		SearchableDropdownApi { runtime: self }
	}
}

impl<D, H, G, S> LoanAppApi<'_, D, H, G, S>
where
	D: Dom,
	H: Host<D::Node>,
	G: GridLibrary<D>,
	S: SelectLibrary<D>,
{
	pub fn config(&self) -> &Settings {
		self.runtime.settings()
	}

	pub fn utils(&self) -> UtilsApi {
		UtilsApi::new(self.runtime.number_format().clone())
	}

	pub fn forms(&mut self) -> FormsApi<'_, D, H, G, S> {
		FormsApi {
			runtime: &mut *self.runtime,
		}
	}

	pub fn tables(&mut self) -> TablesApi<'_, D, H, G, S> {
		TablesApi {
			runtime: &mut *self.runtime,
		}
	}
}

impl<D, H, G, S> FormsApi<'_, D, H, G, S>
where
	D: Dom,
	H: Host<D::Node>,
	G: GridLibrary<D>,
	S: SelectLibrary<D>,
{
	/// Binds validators and the submission guard to the current fields
	pub fn init(&mut self) -> FormWiring {
		self.runtime.wire_forms()
	}

	pub fn validate_numeric_input(&mut self, field: &D::Node) -> FieldState {
		self.runtime.validate_numeric_field(field)
	}

	pub fn validate_date_input(&mut self, field: &D::Node) -> FieldState {
		self.runtime.validate_date_input(field)
	}

	pub fn update_calculations(&mut self, field: &D::Node) {
		self.runtime.update_calculations(field);
	}

	pub fn handle_submission(&mut self, form: &D::Node) -> Dispatch {
		self.runtime.handle_submission(form)
	}

	/// Completion signal for a submission in flight
	pub fn complete_submission(&mut self, form: &D::Node) -> bool {
		self.runtime.complete_submission(form)
	}
}

impl<D, H, G, S> TablesApi<'_, D, H, G, S>
where
	D: Dom,
	H: Host<D::Node>,
	G: GridLibrary<D>,
	S: SelectLibrary<D>,
{
	pub fn init(&mut self) -> Vec<(String, InitOutcome)> {
		self.runtime.init_tables()
	}

	pub fn init_customer_summary_table(&mut self) -> Option<InitOutcome> {
		self.runtime.init_customer_summary()
	}

	pub fn init_customer_table(&mut self) -> Option<InitOutcome> {
		self.runtime.init_customer_table()
	}

	/// Completion signal: the container's rows are in place
	pub fn settled(&mut self, container_id: &str) -> Option<InitOutcome> {
		self.runtime.notify_settled(container_id)
	}

	pub fn destroy(&mut self, id: &str) -> bool {
		self.runtime.destroy_table(id).is_some()
	}
}

impl<D, H, G, S> SearchableDropdownApi<'_, D, H, G, S>
where
	D: Dom,
	H: Host<D::Node>,
	G: GridLibrary<D>,
	S: SelectLibrary<D>,
{
	pub fn refresh(&mut self) -> usize {
		self.runtime.refresh_dropdowns()
	}

	pub fn add_option(
		&mut self,
		select: &D::Node,
		value: &str,
		text: &str,
		data: &BTreeMap<String, String>,
	) -> D::Node {
		self.runtime.add_option(select, value, text, data)
	}

	pub fn initialize(&mut self) -> usize {
		self.runtime.initialize_dropdowns()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{MockHost, test_runtime};
	use loandesk_core::dom::{MemoryDom, el};
	use loandesk_forms::{FieldError, INVALID_CLASS};
	use rstest::rstest;

	#[rstest]
	#[case("1234.5", "₹1,234.50")]
	#[case("", "₹0.00")]
	#[case("abc", "₹0.00")]
	fn test_utils_currency(#[case] input: &str, #[case] expected: &str) {
		let mut runtime = test_runtime(MemoryDom::new(), MockHost::default());
		assert_eq!(runtime.loan_app().utils().format_currency(input), expected);
	}

	#[rstest]
	fn test_utils() {
		let mut runtime = test_runtime(MemoryDom::new(), MockHost::default());
		let utils = runtime.loan_app().utils();
		assert_eq!(utils.format_percentage(7.0), "7.00%");
		assert_eq!(utils.calculate_days("2024-01-10", "2024-01-01"), 9);
		assert_eq!(utils.safe_number("12abc", 0.0), 12.0);
	}

	#[rstest]
	fn test_forms_namespace() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let field = dom.append(body, el("input").attr("type", "number").value("-5"));
		let mut runtime = test_runtime(dom, MockHost::default());

		let state = runtime.loan_app().forms().validate_numeric_input(&field);
		assert_eq!(state.error(), Some(&FieldError::NegativeNumber));
		assert!(runtime.dom().has_class(&field, INVALID_CLASS));
	}

	#[rstest]
	fn test_dropdown_namespace() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let select = dom.append(body, el("select").class("searchable-dropdown"));
		let mut runtime = test_runtime(dom, MockHost::default());
		let mut api = runtime.searchable_dropdown();
		assert_eq!(api.initialize(), 1);
		api.add_option(&select, "3", "Steel rod", &BTreeMap::new());
		assert_eq!(api.refresh(), 1);
		assert_eq!(runtime.select_library().live_instances(runtime.dom()), 1);
	}
}
