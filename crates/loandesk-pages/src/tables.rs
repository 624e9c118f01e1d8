//! Table discovery and grid setup
//!
//! Generic `.table` elements get the standard grid. The customer tables are
//! excluded from discovery and set up by their own routines: the summary grid
//! immediately, the customer grid after the document settles.

use loandesk_core::dom::{Dom, Selector};
use loandesk_core::{info_log, warn_log};
use loandesk_widgets::{
	DestroyOutcome, GridLibrary, GridOptions, GridRequest, InitOutcome, SelectLibrary,
};

use crate::host::Host;
use crate::runtime::{PageRuntime, Task};
use crate::settings::TableSettings;

pub const CUSTOMER_TABLE_ID: &str = "customersTable";
pub const CUSTOMER_SUMMARY_TABLE_ID: &str = "customerSummaryTable";
/// Opt-out attribute for generic discovery
pub const NO_GRID_ATTRIBUTE: &str = "data-no-datatable";
/// Prefix of ids generated for tables that have none
pub const UNNAMED_TABLE_PREFIX: &str = "unnamed-table";

/// Selector of generically enhanced tables
pub fn generic_tables(settings: &TableSettings) -> Selector {
	settings
		.excluded_ids
		.iter()
		.fold(Selector::class("table"), |selector, id| selector.not_id(id))
}

/// Whether an opt-out attribute value reads as true
fn opts_out(value: &str) -> bool {
	!matches!(value.trim(), "" | "false" | "0" | "null")
}

/// Tables the standard grid applies to, in document order
pub fn discover_tables<D: Dom + ?Sized>(dom: &D, settings: &TableSettings) -> Vec<D::Node> {
	dom.select_all(&generic_tables(settings))
		.into_iter()
		.filter(|table| {
			dom.attribute(table, NO_GRID_ATTRIBUTE)
				.is_none_or(|value| !opts_out(&value))
		})
		.collect()
}

impl<D, H, G, S> PageRuntime<D, H, G, S>
where
	D: Dom,
	H: Host<D::Node>,
	G: GridLibrary<D>,
	S: SelectLibrary<D>,
{
	/// Id of `table`, generating `unnamed-table-N` when it has none
	pub fn ensure_table_id(&mut self, table: &D::Node) -> String {
		if let Some(id) = self.dom.attribute(table, "id").filter(|id| !id.is_empty()) {
			return id;
		}
		self.unnamed_tables += 1;
		let id = format!("{}-{}", UNNAMED_TABLE_PREFIX, self.unnamed_tables);
		self.dom.set_attribute(table, "id", &id);
		id
	}

	/// Sets up every discovered table, then the customer summary grid
	pub fn init_tables(&mut self) -> Vec<(String, InitOutcome)> {
		let tables = discover_tables(&self.dom, &self.settings.tables);
		let request = GridRequest::new(GridOptions::standard(
			self.settings.tables.default_page_length,
		));
		let mut outcomes = Vec::with_capacity(tables.len() + 1);
		for table in tables {
			let id = self.ensure_table_id(&table);
			let outcome = self
				.widgets
				.initialize_grid(&mut self.dom, &mut self.grid, &table, &request);
			outcomes.push((id, outcome));
		}
		if let Some(outcome) = self.init_customer_summary() {
			outcomes.push((CUSTOMER_SUMMARY_TABLE_ID.to_string(), outcome));
		}
		outcomes
	}

	/// Sets up the reports page's customer summary grid, if present
	pub fn init_customer_summary(&mut self) -> Option<InitOutcome> {
		let table = self.dom.get_element_by_id(CUSTOMER_SUMMARY_TABLE_ID)?;
		let request = GridRequest::new(GridOptions::customer_summary(
			self.settings.tables.summary_page_length,
		));
		let outcome = self
			.widgets
			.initialize_grid(&mut self.dom, &mut self.grid, &table, &request);
		match &outcome {
			InitOutcome::Initialized => info_log!("Customer summary DataTable initialized"),
			InitOutcome::Degraded(err) => {
				warn_log!("Failed to initialize customer summary DataTable: {}", err)
			}
			_ => {}
		}
		Some(outcome)
	}

	/// Tears down and re-parks the customer grid, if present
	///
	/// The grid is created when the container is reported settled or, at the
	/// latest, after the settle delay. An empty customer list stays a plain
	/// table.
	pub fn init_customer_table(&mut self) -> Option<InitOutcome> {
		let table = self.dom.get_element_by_id(CUSTOMER_TABLE_ID)?;
		let request = GridRequest::new(GridOptions::customers(
			self.settings.tables.default_page_length,
		))
		.skip_when_showing(self.settings.tables.customer_empty_marker.clone());
		let outcome = self
			.widgets
			.defer_grid(&mut self.dom, &mut self.grid, &table, request);
		if let InitOutcome::Deferred(token) = &outcome {
			let delay = self.settings.timing.widget_settle();
			self.schedule(delay, Task::InitDeferredGrid(token.clone()));
		}
		Some(outcome)
	}

	/// Tears down the grid on the table with `id`
	pub fn destroy_table(&mut self, id: &str) -> Option<DestroyOutcome<D::Node>> {
		let table = self.dom.get_element_by_id(id)?;
		let outcome = self
			.widgets
			.destroy_grid(&mut self.dom, &mut self.grid, &table);
		if matches!(outcome, DestroyOutcome::Recovered(_)) {
			self.events.prune(&self.dom);
		}
		Some(outcome)
	}
}
