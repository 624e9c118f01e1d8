//! Data grid capability
//!
//! A grid library turns a plain `<table>` into a paged, sortable, searchable
//! grid. The page layer only sees it through [`GridLibrary`], which is
//! implemented by the browser binding and by the in-memory fake used in tests.

pub mod options;
pub mod pagination;
pub mod sorting;

use loandesk_core::dom::Dom;

pub use options::{
	CURRENCY_CLASS, CellRenderer, CellValue, ColumnDef, ColumnTarget, GridLanguage, GridOptions,
	NO_SORT_CLASS, PERCENTAGE_CLASS, RenderKind, header_cells, resolve_columns,
};
pub use pagination::Pagination;
pub use sorting::{ColumnOrder, SortDirection};

use crate::error::WidgetResult;

/// Classes a grid adds to its table
pub const GRID_TABLE_CLASSES: &[&str] = &["dataTable", "no-footer", "dtr-inline", "collapsed"];
/// Attributes a grid sets on its table
pub const GRID_TABLE_ATTRIBUTES: &[&str] = &["role", "aria-describedby", "width", "style"];
/// Class of the wrapper element a grid generates around its table
pub const GRID_WRAPPER_CLASS: &str = "dataTables_wrapper";
/// Per-cell bookkeeping key a grid stores on `td`/`th` elements
pub const GRID_CELL_INDEX_KEY: &str = "_DT_CellIndex";
/// Listener namespace used by the grid
pub const GRID_EVENT_NAMESPACE: &str = "dt";
/// Attributes a grid sets on cells
pub const GRID_CELL_ATTRIBUTES: &[&str] = &["tabindex", "style"];
/// Class prefixes a grid adds to cells
pub const GRID_CELL_CLASS_PREFIXES: &[&str] = &["sorting", "dtr-", "dt-"];

/// Id of the wrapper a grid generates for the table with `table_id`
pub fn wrapper_id(table_id: &str) -> String {
	format!("{table_id}_wrapper")
}

/// Operations needed from a grid library
pub trait GridLibrary<D: Dom + ?Sized> {
	/// Whether the library is loaded at all
	fn is_available(&self) -> bool;

	/// Whether a live grid instance is bound to `table`
	fn is_installed(&self, dom: &D, table: &D::Node) -> bool;

	fn create(&mut self, dom: &mut D, table: &D::Node, options: &GridOptions) -> WidgetResult<()>;

	/// Drops buffered rows and redraws the (now empty) grid
	fn clear_and_draw(&mut self, dom: &mut D, table: &D::Node) -> WidgetResult<()>;

	/// Detaches the instance; `remove_from_dom` also removes the table
	fn destroy(&mut self, dom: &mut D, table: &D::Node, remove_from_dom: bool) -> WidgetResult<()>;
}
