//! Widget lifecycle management
//!
//! Makes (re)initialization of grids and searchable selects idempotent: every
//! initialization first tears down whatever is bound to the container, and a
//! teardown leaves the container exactly as the server rendered it.
//!
//! ## Teardown
//!
//! For a bound grid container, [`WidgetLifecycleManager::destroy_grid`]:
//!
//! 1. clears and redraws the grid, then detaches the instance
//! 2. unwraps the container from any generated wrapper element
//! 3. strips grid classes, attributes and stored data from the container
//! 4. strips grid bookkeeping from every `td`/`th` cell
//! 5. removes every listener in the grid's namespace
//!
//! If the library itself fails during teardown the container is replaced with
//! a clean copy of itself, which carries no listeners and no stored data.
//!
//! ## Deferred initialization
//!
//! After a DOM mutation (a row deletion, say) a grid should not inspect the
//! table until the mutation settles. [`WidgetLifecycleManager::defer_grid`]
//! tears down immediately and parks the initialization under a generation
//! token. Either the caller's fallback timer or an explicit settle signal runs
//! it; whichever comes second finds the token consumed and does nothing.

use std::collections::BTreeMap;

use loandesk_core::dom::{Dom, Selector};
use loandesk_core::{info_log, warn_log};

use crate::error::WidgetError;
use crate::grid::{
	GRID_CELL_ATTRIBUTES, GRID_CELL_CLASS_PREFIXES, GRID_CELL_INDEX_KEY, GRID_EVENT_NAMESPACE,
	GRID_TABLE_ATTRIBUTES, GRID_TABLE_CLASSES, GRID_WRAPPER_CLASS, GridLibrary, GridOptions,
	wrapper_id,
};
use crate::select::{SELECT_EVENT_NAMESPACE, SelectLibrary, SelectOptions};

/// Result of a teardown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyOutcome<N> {
	/// Nothing was bound; the container was not touched
	NotBound,
	Destroyed,
	/// The library failed; the container was replaced by this clean copy
	Recovered(N),
}

/// Why an initialization did not create a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	/// The container shows the server's "no rows" placeholder
	EmptyPlaceholder,
	/// The container has no row body to enhance
	MissingBody,
	/// The container is gone from the document
	Detached,
}

/// Token of a parked grid initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredInit {
	pub container_id: String,
	pub generation: u64,
}

/// Result of an initialization request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
	Initialized,
	Skipped(SkipReason),
	Deferred(DeferredInit),
	/// The widget could not be created; the element stays plain
	Degraded(WidgetError),
}

impl InitOutcome {
	pub fn is_initialized(&self) -> bool {
		matches!(self, Self::Initialized)
	}
}

/// A grid initialization request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRequest {
	pub options: GridOptions,
	/// Body text that marks an empty table; such tables are left plain
	pub empty_marker: Option<String>,
}

impl GridRequest {
	pub fn new(options: GridOptions) -> Self {
		Self {
			options,
			empty_marker: None,
		}
	}

	pub fn skip_when_showing(mut self, marker: impl Into<String>) -> Self {
		self.empty_marker = Some(marker.into());
		self
	}
}

#[derive(Debug, Clone)]
struct PendingInit {
	generation: u64,
	request: GridRequest,
}

/// Tracks which containers carry a live grid and runs parked initializations
#[derive(Debug, Default)]
pub struct WidgetLifecycleManager {
	bound: BTreeMap<String, GridOptions>,
	pending: BTreeMap<String, PendingInit>,
	next_generation: u64,
}

fn element_id<D: Dom + ?Sized>(dom: &D, node: &D::Node) -> String {
	dom.attribute(node, "id").unwrap_or_default()
}

impl WidgetLifecycleManager {
	pub fn new() -> Self {
		Self::default()
	}

	/// Ids of containers with a live grid created through this manager
	pub fn bound_ids(&self) -> impl Iterator<Item = &str> {
		self.bound.keys().map(String::as_str)
	}

	/// Options the grid on `container_id` was created with
	pub fn options_of(&self, container_id: &str) -> Option<&GridOptions> {
		self.bound.get(container_id)
	}

	pub fn has_pending(&self, container_id: &str) -> bool {
		self.pending.contains_key(container_id)
	}

	/// Tears down the grid bound to `container`, if any
	pub fn destroy_grid<D, L>(
		&mut self,
		dom: &mut D,
		library: &mut L,
		container: &D::Node,
	) -> DestroyOutcome<D::Node>
	where
		D: Dom + ?Sized,
		L: GridLibrary<D> + ?Sized,
	{
		let id = element_id(dom, container);
		// an explicit teardown also cancels a parked creation
		self.pending.remove(&id);
		let recorded = self.bound.remove(&id).is_some();
		if !recorded && !library.is_installed(dom, container) {
			return DestroyOutcome::NotBound;
		}

		let teardown = library
			.clear_and_draw(dom, container)
			.and_then(|()| library.destroy(dom, container, false));
		match teardown {
			Ok(()) => {
				scrub_grid(dom, container);
				info_log!("DataTable destroyed: {}", id);
				DestroyOutcome::Destroyed
			}
			Err(err) => {
				warn_log!("Error during DataTable cleanup of {}: {}", id, err);
				let replacement = dom.replace_with_clone(container);
				scrub_grid(dom, &replacement);
				DestroyOutcome::Recovered(replacement)
			}
		}
	}

	/// Tears down, then creates a grid on `container`
	///
	/// Never fails: library errors are logged and reported as
	/// [`InitOutcome::Degraded`].
	pub fn initialize_grid<D, L>(
		&mut self,
		dom: &mut D,
		library: &mut L,
		container: &D::Node,
		request: &GridRequest,
	) -> InitOutcome
	where
		D: Dom + ?Sized,
		L: GridLibrary<D> + ?Sized,
	{
		let container = self.prepare_grid(dom, library, container, request);
		match container {
			Ok(container) => self.create_grid(dom, library, &container, &request.options),
			Err(reason) => {
				info_log!("Skipping DataTable initialization: {:?}", reason);
				InitOutcome::Skipped(reason)
			}
		}
	}

	/// Tears down now and parks the creation until the document settles
	///
	/// The caller schedules the fallback that passes the returned token to
	/// [`WidgetLifecycleManager::run_deferred`].
	pub fn defer_grid<D, L>(
		&mut self,
		dom: &mut D,
		library: &mut L,
		container: &D::Node,
		request: GridRequest,
	) -> InitOutcome
	where
		D: Dom + ?Sized,
		L: GridLibrary<D> + ?Sized,
	{
		if let Err(reason) = self.prepare_grid(dom, library, container, &request) {
			info_log!("Skipping DataTable initialization: {:?}", reason);
			return InitOutcome::Skipped(reason);
		}
		self.next_generation += 1;
		let container_id = element_id(dom, container);
		let generation = self.next_generation;
		self.pending
			.insert(container_id.clone(), PendingInit { generation, request });
		InitOutcome::Deferred(DeferredInit {
			container_id,
			generation,
		})
	}

	/// Runs a parked initialization if `token` is still the current one
	///
	/// Returns `None` for a stale or already consumed token.
	pub fn run_deferred<D, L>(
		&mut self,
		dom: &mut D,
		library: &mut L,
		token: &DeferredInit,
	) -> Option<InitOutcome>
	where
		D: Dom + ?Sized,
		L: GridLibrary<D> + ?Sized,
	{
		if self.pending.get(&token.container_id)?.generation != token.generation {
			return None;
		}
		self.settle(dom, library, &token.container_id)
	}

	/// Runs the parked initialization of `container_id` right away
	pub fn settle<D, L>(
		&mut self,
		dom: &mut D,
		library: &mut L,
		container_id: &str,
	) -> Option<InitOutcome>
	where
		D: Dom + ?Sized,
		L: GridLibrary<D> + ?Sized,
	{
		let pending = self.pending.remove(container_id)?;
		let Some(container) = dom.get_element_by_id(container_id) else {
			return Some(InitOutcome::Skipped(SkipReason::Detached));
		};
		Some(self.create_grid(dom, library, &container, &pending.request.options))
	}

	/// Tears down the select widget on `select`, if any
	pub fn destroy_select<D, L>(
		&mut self,
		dom: &mut D,
		library: &mut L,
		select: &D::Node,
	) -> DestroyOutcome<D::Node>
	where
		D: Dom + ?Sized,
		L: SelectLibrary<D> + ?Sized,
	{
		if !library.is_installed(dom, select) {
			return DestroyOutcome::NotBound;
		}
		match library.destroy(dom, select) {
			Ok(()) => {
				dom.remove_listeners(select, SELECT_EVENT_NAMESPACE);
				DestroyOutcome::Destroyed
			}
			Err(err) => {
				warn_log!("Error during select cleanup: {}", err);
				DestroyOutcome::Recovered(dom.replace_with_clone(select))
			}
		}
	}

	/// Tears down, then creates a select widget on `select`
	pub fn initialize_select<D, L>(
		&mut self,
		dom: &mut D,
		library: &mut L,
		select: &D::Node,
		options: &SelectOptions<D::Node>,
	) -> InitOutcome
	where
		D: Dom + ?Sized,
		L: SelectLibrary<D> + ?Sized,
	{
		let select = match self.destroy_select(dom, library, select) {
			DestroyOutcome::Recovered(replacement) => replacement,
			_ => select.clone(),
		};
		if !library.is_available() {
			return InitOutcome::Degraded(WidgetError::LibraryUnavailable("select"));
		}
		match library.create(dom, &select, options) {
			Ok(()) => InitOutcome::Initialized,
			Err(err) => {
				warn_log!("Searchable select initialization failed: {}", err);
				dom.remove_listeners(&select, SELECT_EVENT_NAMESPACE);
				InitOutcome::Degraded(err)
			}
		}
	}

	/// Teardown plus placeholder check; returns the container to enhance
	fn prepare_grid<D, L>(
		&mut self,
		dom: &mut D,
		library: &mut L,
		container: &D::Node,
		request: &GridRequest,
	) -> Result<D::Node, SkipReason>
	where
		D: Dom + ?Sized,
		L: GridLibrary<D> + ?Sized,
	{
		if !dom.is_connected(container) {
			return Err(SkipReason::Detached);
		}
		let container = match self.destroy_grid(dom, library, container) {
			DestroyOutcome::Recovered(replacement) => replacement,
			_ => container.clone(),
		};

		if let Some(marker) = &request.empty_marker {
			let body = dom
				.query_selector(&container, &Selector::tag("tbody"))
				.ok_or(SkipReason::MissingBody)?;
			if dom.text_content(&body).contains(marker.as_str()) {
				return Err(SkipReason::EmptyPlaceholder);
			}
		}
		Ok(container)
	}

	fn create_grid<D, L>(
		&mut self,
		dom: &mut D,
		library: &mut L,
		container: &D::Node,
		options: &GridOptions,
	) -> InitOutcome
	where
		D: Dom + ?Sized,
		L: GridLibrary<D> + ?Sized,
	{
		let id = element_id(dom, container);
		let created = if library.is_available() {
			library.create(dom, container, options)
		} else {
			Err(WidgetError::LibraryUnavailable("grid"))
		};
		match created {
			Ok(()) => {
				info_log!("DataTable initialized for: {}", id);
				self.bound.insert(id, options.clone());
				InitOutcome::Initialized
			}
			Err(err) => {
				warn_log!("DataTable initialization failed for {}: {}", id, err);
				scrub_grid(dom, container);
				InitOutcome::Degraded(err)
			}
		}
	}
}

/// Restores a grid container to its server-rendered state
pub fn scrub_grid<D: Dom + ?Sized>(dom: &mut D, container: &D::Node) {
	unwrap_from_wrappers(dom, container);

	for class in GRID_TABLE_CLASSES {
		dom.remove_class(container, class);
	}
	for attr in GRID_TABLE_ATTRIBUTES {
		dom.remove_attribute(container, attr);
	}
	dom.clear_data(container);

	let cells = dom.query_selector_all(container, &Selector::tag("td").or(Selector::tag("th")));
	for cell in &cells {
		dom.remove_data(cell, GRID_CELL_INDEX_KEY);
		for attr in GRID_CELL_ATTRIBUTES {
			dom.remove_attribute(cell, attr);
		}
		let classes = dom.attribute(cell, "class").unwrap_or_default();
		for class in classes.split_whitespace().filter(|class| {
			GRID_CELL_CLASS_PREFIXES
				.iter()
				.any(|prefix| class.starts_with(prefix))
		}) {
			dom.remove_class(cell, class);
		}
	}

	dom.remove_listeners(container, GRID_EVENT_NAMESPACE);
}

fn unwrap_from_wrappers<D: Dom + ?Sized>(dom: &mut D, container: &D::Node) {
	let by_class = Selector::class(GRID_WRAPPER_CLASS);
	while let Some(wrapper) = dom
		.parent(container)
		.and_then(|parent| dom.closest(&parent, &by_class))
	{
		unwrap(dom, container, &wrapper);
	}

	let id = element_id(dom, container);
	if id.is_empty() {
		return;
	}
	if let Some(wrapper) = dom.get_element_by_id(&wrapper_id(&id)) {
		let holds_container = dom
			.closest(container, &Selector::id(wrapper_id(&id)))
			.is_some();
		if holds_container {
			unwrap(dom, container, &wrapper);
		} else {
			dom.remove(&wrapper);
		}
	}
}

/// Moves `container` to where `wrapper` sits, then drops `wrapper`
fn unwrap<D: Dom + ?Sized>(dom: &mut D, container: &D::Node, wrapper: &D::Node) {
	match dom.parent(wrapper) {
		Some(parent) => {
			dom.insert_before(&parent, container, wrapper);
			dom.remove(wrapper);
		}
		None => dom.remove(container),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{FakeGridLibrary, FakeSelectLibrary};
	use crate::select::SelectFamily;
	use loandesk_core::dom::{MemoryDom, NodeId, el};
	use rstest::{fixture, rstest};

	#[fixture]
	fn table_page() -> (MemoryDom, NodeId) {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let table = dom.append(
			body,
			el("table")
				.id("loansTable")
				.class("table")
				.child(el("thead").child(
					el("tr")
						.child(el("th").text("Date"))
						.child(el("th").class("currency").text("Amount")),
				))
				.child(el("tbody").child(
					el("tr")
						.child(el("td").text("2024-01-01"))
						.child(el("td").text("1500")),
				)),
		);
		(dom, table)
	}

	#[rstest]
	fn test_destroy_unbound_is_noop(table_page: (MemoryDom, NodeId)) {
		let (mut dom, table) = table_page;
		dom.set_attribute(&table, "style", "width: 50%");
		let before = dom.outer_html(table);

		let mut grid = FakeGridLibrary::new();
		let mut manager = WidgetLifecycleManager::new();
		assert_eq!(manager.destroy_grid(&mut dom, &mut grid, &table), DestroyOutcome::NotBound);
		assert_eq!(dom.outer_html(table), before);
	}

	#[rstest]
	fn test_initialize_then_destroy_restores_markup(table_page: (MemoryDom, NodeId)) {
		let (mut dom, table) = table_page;
		let before = dom.outer_html(table);
		let mut grid = FakeGridLibrary::new();
		let mut manager = WidgetLifecycleManager::new();

		let outcome = manager.initialize_grid(
			&mut dom,
			&mut grid,
			&table,
			&GridRequest::new(GridOptions::standard(10)),
		);
		assert!(outcome.is_initialized());
		assert!(dom.has_class(&table, "dataTable"));
		assert!(dom.get_element_by_id("loansTable_wrapper").is_some());

		assert_eq!(manager.destroy_grid(&mut dom, &mut grid, &table), DestroyOutcome::Destroyed);
		assert!(dom.get_element_by_id("loansTable_wrapper").is_none());
		assert!(dom.listeners(&table).is_empty());
		assert_eq!(dom.parent(&table), Some(dom.body()));
		assert_eq!(dom.outer_html(table).replace("₹1,500.00", "1500"), before);
		for cell in dom.query_selector_all(&table, &Selector::tag("td")) {
			assert!(dom.data_keys(&cell).is_empty());
		}
	}

	#[rstest]
	fn test_failing_teardown_replaces_container(table_page: (MemoryDom, NodeId)) {
		let (mut dom, table) = table_page;
		let mut grid = FakeGridLibrary::new();
		let mut manager = WidgetLifecycleManager::new();
		let request = GridRequest::new(GridOptions::standard(10));
		manager.initialize_grid(&mut dom, &mut grid, &table, &request);

		grid.fail_destroy(true);
		let DestroyOutcome::Recovered(copy) = manager.destroy_grid(&mut dom, &mut grid, &table)
		else {
			panic!("expected recovery by replacement");
		};
		assert!(!dom.is_connected(&table));
		assert_eq!(dom.get_element_by_id("loansTable"), Some(copy));
		assert!(dom.listeners(&copy).is_empty());
		assert!(!dom.has_class(&copy, "dataTable"));
		assert!(dom.get_element_by_id("loansTable_wrapper").is_none());

		grid.fail_destroy(false);
		let outcome = manager.initialize_grid(&mut dom, &mut grid, &copy, &request);
		assert!(outcome.is_initialized());
		assert_eq!(grid.live_instances(&dom), 1);
	}

	#[rstest]
	fn test_reinitialize_keeps_single_instance(table_page: (MemoryDom, NodeId)) {
		let (mut dom, table) = table_page;
		let mut grid = FakeGridLibrary::new();
		let mut manager = WidgetLifecycleManager::new();
		let request = GridRequest::new(GridOptions::standard(10));
		for _ in 0..3 {
			manager.initialize_grid(&mut dom, &mut grid, &table, &request);
		}
		assert_eq!(grid.live_instances(&dom), 1);
		assert_eq!(grid.created(), 3);
		assert_eq!(dom.listeners(&table).len(), 3);
		assert_eq!(manager.bound_ids().collect::<Vec<_>>(), vec!["loansTable"]);
	}

	#[rstest]
	fn test_create_failure_degrades(table_page: (MemoryDom, NodeId)) {
		let (mut dom, table) = table_page;
		let mut grid = FakeGridLibrary::new();
		grid.fail_create(true);
		let mut manager = WidgetLifecycleManager::new();
		let outcome = manager.initialize_grid(
			&mut dom,
			&mut grid,
			&table,
			&GridRequest::new(GridOptions::customers(10)),
		);
		assert!(matches!(outcome, InitOutcome::Degraded(WidgetError::CreateFailed { .. })));
		assert!(!dom.has_class(&table, "dataTable"));
		assert_eq!(manager.bound_ids().count(), 0);
	}

	#[rstest]
	fn test_unavailable_library_degrades(table_page: (MemoryDom, NodeId)) {
		let (mut dom, table) = table_page;
		let mut grid = FakeGridLibrary::new();
		grid.set_available(false);
		let outcome = WidgetLifecycleManager::new().initialize_grid(
			&mut dom,
			&mut grid,
			&table,
			&GridRequest::new(GridOptions::standard(10)),
		);
		assert_eq!(outcome, InitOutcome::Degraded(WidgetError::LibraryUnavailable("grid")));
	}

	#[rstest]
	fn test_empty_placeholder_is_skipped() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let table = dom.append(
			body,
			el("table").id("customersTable").child(
				el("tbody").child(el("tr").child(el("td").attr("colspan", "11").text("No customers found"))),
			),
		);
		let mut grid = FakeGridLibrary::new();
		let request = GridRequest::new(GridOptions::customers(10)).skip_when_showing("No customers found");
		let outcome = WidgetLifecycleManager::new().initialize_grid(&mut dom, &mut grid, &table, &request);
		assert_eq!(outcome, InitOutcome::Skipped(SkipReason::EmptyPlaceholder));
		assert_eq!(grid.created(), 0);
	}

	#[rstest]
	fn test_deferred_init_runs_once(table_page: (MemoryDom, NodeId)) {
		let (mut dom, table) = table_page;
		let mut grid = FakeGridLibrary::new();
		let mut manager = WidgetLifecycleManager::new();
		let request = GridRequest::new(GridOptions::customers(10));

		let InitOutcome::Deferred(first) = manager.defer_grid(&mut dom, &mut grid, &table, request.clone())
		else {
			panic!("expected deferral");
		};
		let InitOutcome::Deferred(second) = manager.defer_grid(&mut dom, &mut grid, &table, request)
		else {
			panic!("expected deferral");
		};
		assert_eq!(grid.created(), 0);

		assert_eq!(manager.run_deferred(&mut dom, &mut grid, &first), None);
		assert_eq!(manager.settle(&mut dom, &mut grid, "loansTable"), Some(InitOutcome::Initialized));
		assert_eq!(manager.run_deferred(&mut dom, &mut grid, &second), None);
		assert_eq!(grid.created(), 1);
	}

	#[rstest]
	fn test_destroy_cancels_parked_init(table_page: (MemoryDom, NodeId)) {
		let (mut dom, table) = table_page;
		let mut grid = FakeGridLibrary::new();
		let mut manager = WidgetLifecycleManager::new();
		let InitOutcome::Deferred(token) = manager.defer_grid(
			&mut dom,
			&mut grid,
			&table,
			GridRequest::new(GridOptions::customers(10)),
		) else {
			panic!("expected deferral");
		};

		assert_eq!(manager.destroy_grid(&mut dom, &mut grid, &table), DestroyOutcome::NotBound);
		assert!(!manager.has_pending("loansTable"));
		assert_eq!(manager.run_deferred(&mut dom, &mut grid, &token), None);
		assert_eq!(manager.settle(&mut dom, &mut grid, "loansTable"), None);
		assert_eq!(grid.created(), 0);
	}

	#[rstest]
	fn test_deferred_init_on_removed_table(table_page: (MemoryDom, NodeId)) {
		let (mut dom, table) = table_page;
		let mut grid = FakeGridLibrary::new();
		let mut manager = WidgetLifecycleManager::new();
		let InitOutcome::Deferred(token) = manager.defer_grid(
			&mut dom,
			&mut grid,
			&table,
			GridRequest::new(GridOptions::standard(10)),
		) else {
			panic!("expected deferral");
		};
		dom.remove(&table);
		assert_eq!(
			manager.run_deferred(&mut dom, &mut grid, &token),
			Some(InitOutcome::Skipped(SkipReason::Detached))
		);
	}

	#[rstest]
	fn test_select_lifecycle() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let select = dom.append(
			body,
			el("select")
				.class("item-dropdown")
				.child(el("option").attr("value", "").text(""))
				.child(el("option").attr("value", "1").text("Bolt")),
		);
		let mut library = FakeSelectLibrary::new();
		let mut manager = WidgetLifecycleManager::new();
		let options = SelectFamily::Item.options_for(&dom, &select);

		assert!(manager.initialize_select(&mut dom, &mut library, &select, &options).is_initialized());
		assert!(manager.initialize_select(&mut dom, &mut library, &select, &options).is_initialized());
		assert_eq!(library.live_instances(&dom), 1);

		assert_eq!(manager.destroy_select(&mut dom, &mut library, &select), DestroyOutcome::Destroyed);
		assert_eq!(library.live_instances(&dom), 0);
		assert_eq!(manager.destroy_select(&mut dom, &mut library, &select), DestroyOutcome::NotBound);
	}
}
