//! Browser adapter (wasm32 only)
//!
//! Binds the runtime to the real document and to the page's JavaScript
//! libraries:
//!
//! - [`WebDom`]: [`Dom`](loandesk_core::dom::Dom) over `web_sys::Element`
//! - [`BrowserHost`]: dialogs, history and the UI toolkit's modal/tooltip
//! - [`WebGridLibrary`] / [`WebSelectLibrary`]: the jQuery grid and select
//!   plugins
//! - [`start`]: creates the page runtime, forwards DOM events and timer ticks
//!   into it and exports the `LoanApp` / `SearchableDropdown` objects

mod app;
mod dom;
mod host;
mod js;
mod libraries;

pub use app::{LoanApp, SearchableDropdown, WebRuntime, start};
pub use dom::WebDom;
pub use host::BrowserHost;
pub use libraries::{WebGridLibrary, WebSelectLibrary};
