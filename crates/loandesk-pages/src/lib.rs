//! Loandesk Pages - page bootstrap and event routing
//!
//! A [`PageRuntime`] owns the document, the host (dialogs, history, the UI
//! toolkit), both widget libraries and a virtual clock. DOM events come in
//! through [`PageRuntime::dispatch`], time through [`PageRuntime::advance`];
//! everything the page does happens inside one of the two.
//!
//! ## Modules
//!
//! - [`bootstrap`]: one-time wiring of the whole page
//! - [`events`]: event types and the binding registry
//! - [`tables`], [`customer`]: grid discovery and the customer page
//! - [`dropdowns`]: searchable selects with retry
//! - [`notices`], [`animation`]: banners, tooltips, entrance effects
//! - [`exports`]: the `LoanApp` / `SearchableDropdown` surface
//! - [`settings`]: inline page settings
//! - `platform` (wasm32): the browser adapter
//!
//! ## Example
//!
//! ```
//! use loandesk_core::dom::{Dom, MemoryDom, el};
//! use loandesk_pages::events::{EventType, PageEvent};
//! use loandesk_pages::testing::{MockHost, test_runtime};
//!
//! let mut dom = MemoryDom::new();
//! let body = dom.body();
//! let field = dom.append(body, el("input").attr("type", "number").value("-5"));
//!
//! let mut runtime = test_runtime(dom, MockHost::default());
//! runtime.bootstrap();
//! runtime.dispatch(PageEvent::new(EventType::Blur, field));
//! assert!(runtime.dom().has_class(&field, "is-invalid"));
//! ```

pub mod animation;
pub mod bootstrap;
pub mod callback;
pub mod customer;
pub mod dropdowns;
pub mod errors;
pub mod events;
pub mod exports;
pub mod host;
pub mod notices;
pub mod runtime;
pub mod settings;
pub mod tables;

#[cfg(target_arch = "wasm32")]
pub mod platform;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bootstrap::{BootstrapReport, FormWiring};
pub use callback::Callback;
pub use customer::CustomerPageReport;
pub use dropdowns::{DropdownInit, SelectChange};
pub use errors::{ErrorDisposition, ErrorLog, UncaughtError};
pub use events::{Dispatch, EventBinding, EventRegistry, EventType, Handler, PageEvent};
pub use exports::{FormsApi, LoanAppApi, SearchableDropdownApi, TablesApi, UtilsApi};
pub use host::Host;
pub use runtime::{PageRuntime, Task};
pub use settings::{Settings, SettingsError};
