//! Loandesk Widgets - data grids and searchable selects
//!
//! Third-party widget libraries are reached through two narrow traits,
//! [`GridLibrary`] and [`SelectLibrary`]. The [`WidgetLifecycleManager`]
//! drives them so that initializing a widget any number of times leaves
//! exactly one live instance and a clean container underneath it.
//!
//! ## Example
//!
//! ```
//! use loandesk_core::dom::{Dom, MemoryDom, el};
//! use loandesk_widgets::testing::FakeGridLibrary;
//! use loandesk_widgets::{GridOptions, GridRequest, WidgetLifecycleManager};
//!
//! let mut dom = MemoryDom::new();
//! let body = dom.body();
//! let table = dom.append(
//! 	body,
//! 	el("table")
//! 		.id("itemsTable")
//! 		.child(el("tbody").child(el("tr").child(el("td").text("Bolt")))),
//! );
//!
//! let mut grid = FakeGridLibrary::new();
//! let mut manager = WidgetLifecycleManager::new();
//! let request = GridRequest::new(GridOptions::standard(10));
//! manager.initialize_grid(&mut dom, &mut grid, &table, &request);
//! manager.initialize_grid(&mut dom, &mut grid, &table, &request);
//! assert_eq!(grid.live_instances(&dom), 1);
//! ```

pub mod availability;
pub mod error;
pub mod grid;
pub mod lifecycle;
pub mod select;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use availability::{AvailabilityProbe, Poll};
pub use error::{WidgetError, WidgetResult};
pub use grid::{CellRenderer, ColumnDef, ColumnTarget, GridLibrary, GridOptions, SortDirection};
pub use lifecycle::{
	DeferredInit, DestroyOutcome, GridRequest, InitOutcome, SkipReason, WidgetLifecycleManager,
	scrub_grid,
};
pub use select::{
	DropdownParent, OptionData, OptionTemplate, SelectFamily, SelectLibrary, SelectOptions,
};
