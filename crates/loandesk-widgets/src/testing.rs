//! In-memory widget libraries for tests
//!
//! Both fakes decorate the document the way the real libraries do (wrapper
//! elements, classes, attributes, per-cell data, namespaced listeners) and
//! leave those decorations behind on teardown, so tests observe whether the
//! lifecycle manager cleans up after them.

use loandesk_core::dom::{Dom, Selector};
use loandesk_core::numeric::{NumberFormat, RawValue};

use crate::error::{WidgetError, WidgetResult};
use crate::grid::{
	CellValue, GRID_CELL_INDEX_KEY, GRID_WRAPPER_CLASS, GridLibrary, GridOptions, Pagination,
	RenderKind, header_cells, wrapper_id,
};
use crate::select::{SELECT_EVENT, SELECT_EVENT_NAMESPACE, SelectLibrary, SelectOptions};

fn describe<D: Dom + ?Sized>(dom: &D, node: &D::Node) -> String {
	dom.attribute(node, "id")
		.map(|id| format!("#{id}"))
		.unwrap_or_else(|| dom.tag_name(node))
}

/// Grid instance recorded by [`FakeGridLibrary`]
#[derive(Debug, Clone)]
pub struct FakeGrid<N> {
	pub table: N,
	pub options: GridOptions,
	pub paging: Pagination,
}

/// Grid library double
#[derive(Debug)]
pub struct FakeGridLibrary<N> {
	available: bool,
	fail_create: bool,
	fail_destroy: bool,
	format: NumberFormat,
	instances: Vec<FakeGrid<N>>,
	created: usize,
	destroyed: usize,
}

impl<N> Default for FakeGridLibrary<N> {
	fn default() -> Self {
		Self::new()
	}
}

impl<N> FakeGridLibrary<N> {
	pub fn new() -> Self {
		Self {
			available: true,
			fail_create: false,
			fail_destroy: false,
			format: NumberFormat::default(),
			instances: Vec::new(),
			created: 0,
			destroyed: 0,
		}
	}

	pub fn set_available(&mut self, available: bool) {
		self.available = available;
	}

	pub fn fail_create(&mut self, fail: bool) {
		self.fail_create = fail;
	}

	pub fn fail_destroy(&mut self, fail: bool) {
		self.fail_destroy = fail;
	}

	/// Number of successful `create` calls
	pub fn created(&self) -> usize {
		self.created
	}

	/// Number of successful `destroy` calls
	pub fn destroyed(&self) -> usize {
		self.destroyed
	}

	pub fn instances(&self) -> &[FakeGrid<N>] {
		&self.instances
	}

	/// Instances whose table is still in the document
	pub fn live_instances<D>(&self, dom: &D) -> usize
	where
		D: Dom<Node = N> + ?Sized,
	{
		self.instances
			.iter()
			.filter(|grid| dom.is_connected(&grid.table))
			.count()
	}

	/// The instance bound to `table`
	pub fn instance(&self, table: &N) -> Option<&FakeGrid<N>>
	where
		N: PartialEq,
	{
		self.instances.iter().find(|grid| &grid.table == table)
	}
}

impl<D> GridLibrary<D> for FakeGridLibrary<D::Node>
where
	D: Dom + ?Sized,
{
	fn is_available(&self) -> bool {
		self.available
	}

	fn is_installed(&self, _dom: &D, table: &D::Node) -> bool {
		self.instances.iter().any(|grid| &grid.table == table)
	}

	fn create(&mut self, dom: &mut D, table: &D::Node, options: &GridOptions) -> WidgetResult<()> {
		if self.fail_create {
			return Err(WidgetError::CreateFailed {
				target: describe(dom, table),
				reason: "Cannot read properties of undefined (reading 'aDataSort')".into(),
			});
		}
		let id = dom.attribute(table, "id").unwrap_or_default();

		// wrapper around the table plus an info line
		if let Some(parent) = dom.parent(table) {
			let wrapper = dom.create_element("div");
			dom.add_class(&wrapper, GRID_WRAPPER_CLASS);
			dom.set_attribute(&wrapper, "id", &wrapper_id(&id));
			dom.insert_before(&parent, &wrapper, table);
			dom.append_child(&wrapper, table);
			let info = dom.create_element("div");
			dom.set_attribute(&info, "id", &format!("{id}_info"));
			dom.append_child(&wrapper, &info);
		}

		dom.add_class(table, "dataTable");
		dom.add_class(table, "no-footer");
		dom.set_attribute(table, "role", "grid");
		dom.set_attribute(table, "aria-describedby", &format!("{id}_info"));
		dom.set_style(table, "width", "100%");
		dom.set_data(table, "DataTable", serde_json::json!({"id": id}));

		for header in header_cells(dom, table) {
			dom.add_class(&header, "sorting");
			dom.set_attribute(&header, "tabindex", "0");
		}

		let rows = dom.query_selector_all(table, &Selector::tag("tr").inside(&Selector::tag("tbody")));
		for (row_index, row) in rows.iter().enumerate() {
			let cells = dom.children_matching(row, &Selector::tag("td"));
			for (column, cell) in cells.iter().enumerate() {
				dom.set_data(
					cell,
					GRID_CELL_INDEX_KEY,
					serde_json::json!({"row": row_index, "column": column}),
				);
				if let Some(renderer) = options.renderer_for(dom, table, column) {
					let raw = dom.text_content(cell);
					let rendered =
						renderer.render(&self.format, RawValue::Text(raw.trim()), RenderKind::Display);
					if let CellValue::Text(text) = rendered {
						dom.set_text_content(cell, &text);
					}
				}
			}
		}

		for event in ["draw.dt", "order.dt", "page.dt"] {
			dom.add_listener(table, event);
		}

		self.instances.push(FakeGrid {
			table: table.clone(),
			options: options.clone(),
			paging: Pagination::new(options.page_length, rows.len()),
		});
		self.created += 1;
		Ok(())
	}

	fn clear_and_draw(&mut self, dom: &mut D, table: &D::Node) -> WidgetResult<()> {
		let grid = self
			.instances
			.iter_mut()
			.find(|grid| &grid.table == table)
			.ok_or_else(|| WidgetError::NotBound(describe(dom, table)))?;
		grid.paging = Pagination::new(grid.options.page_length, 0);
		Ok(())
	}

	fn destroy(&mut self, dom: &mut D, table: &D::Node, remove_from_dom: bool) -> WidgetResult<()> {
		if self.fail_destroy {
			return Err(WidgetError::DestroyFailed {
				target: describe(dom, table),
				reason: "Cannot read properties of undefined (reading 'nTable')".into(),
			});
		}
		let before = self.instances.len();
		self.instances.retain(|grid| &grid.table != table);
		if self.instances.len() == before {
			return Err(WidgetError::NotBound(describe(dom, table)));
		}
		if remove_from_dom {
			dom.remove(table);
		}
		self.destroyed += 1;
		Ok(())
	}
}

/// Select instance recorded by [`FakeSelectLibrary`]
#[derive(Debug, Clone)]
pub struct FakeSelect<N> {
	pub select: N,
	pub options: SelectOptions<N>,
	/// The generated container element shown instead of the select
	pub container: N,
}

/// Searchable select library double
#[derive(Debug)]
pub struct FakeSelectLibrary<N> {
	available: bool,
	fail_create: bool,
	instances: Vec<FakeSelect<N>>,
	created: usize,
}

impl<N> Default for FakeSelectLibrary<N> {
	fn default() -> Self {
		Self::new()
	}
}

impl<N> FakeSelectLibrary<N> {
	pub fn new() -> Self {
		Self {
			available: true,
			fail_create: false,
			instances: Vec::new(),
			created: 0,
		}
	}

	pub fn set_available(&mut self, available: bool) {
		self.available = available;
	}

	pub fn fail_create(&mut self, fail: bool) {
		self.fail_create = fail;
	}

	pub fn created(&self) -> usize {
		self.created
	}

	pub fn instances(&self) -> &[FakeSelect<N>] {
		&self.instances
	}

	pub fn live_instances<D>(&self, dom: &D) -> usize
	where
		D: Dom<Node = N> + ?Sized,
	{
		self.instances
			.iter()
			.filter(|instance| dom.is_connected(&instance.select))
			.count()
	}

	pub fn instance(&self, select: &N) -> Option<&FakeSelect<N>>
	where
		N: PartialEq,
	{
		self.instances.iter().find(|instance| &instance.select == select)
	}
}

impl<D> SelectLibrary<D> for FakeSelectLibrary<D::Node>
where
	D: Dom + ?Sized,
{
	fn is_available(&self) -> bool {
		self.available
	}

	fn is_installed(&self, _dom: &D, select: &D::Node) -> bool {
		self.instances.iter().any(|instance| &instance.select == select)
	}

	fn create(
		&mut self,
		dom: &mut D,
		select: &D::Node,
		options: &SelectOptions<D::Node>,
	) -> WidgetResult<()> {
		if self.fail_create {
			return Err(WidgetError::CreateFailed {
				target: describe(dom, select),
				reason: "select2 is not a function".into(),
			});
		}
		let container = dom.create_element("span");
		dom.add_class(&container, "select2");
		dom.add_class(&container, "select2-container");
		if let Some(parent) = dom.parent(select) {
			let siblings = dom.children(&parent);
			let next = siblings
				.iter()
				.position(|child| child == select)
				.and_then(|i| siblings.get(i + 1).cloned());
			match next {
				Some(reference) => dom.insert_before(&parent, &container, &reference),
				None => dom.append_child(&parent, &container),
			}
		}
		dom.add_class(select, "select2-hidden-accessible");
		dom.set_attribute(select, "aria-hidden", "true");
		dom.add_listener(select, &format!("{SELECT_EVENT}.{SELECT_EVENT_NAMESPACE}"));

		self.instances.push(FakeSelect {
			select: select.clone(),
			options: options.clone(),
			container,
		});
		self.created += 1;
		Ok(())
	}

	fn destroy(&mut self, dom: &mut D, select: &D::Node) -> WidgetResult<()> {
		let index = self
			.instances
			.iter()
			.position(|instance| &instance.select == select)
			.ok_or_else(|| WidgetError::NotBound(describe(dom, select)))?;
		let instance = self.instances.remove(index);
		dom.remove(&instance.container);
		dom.remove_class(select, "select2-hidden-accessible");
		dom.remove_attribute(select, "aria-hidden");
		Ok(())
	}
}
