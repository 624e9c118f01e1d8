//! Page bootstrap, event routing and the browser adapter
//!
//! On `wasm32` the runtime starts itself when the module loads; see
//! `loandesk_pages::platform`. Elsewhere a [`PageRuntime`] is built by hand
//! around any [`Dom`](crate::core::Dom) and [`Host`].
//!
//! ## Example
//!
//! ```
//! # #[cfg(feature = "testing")]
//! # {
//! use loandesk::core::dom::{MemoryDom, el};
//! use loandesk::pages::testing::{MockHost, test_runtime};
//!
//! let mut dom = MemoryDom::new();
//! let body = dom.body();
//! dom.append(body, el("div").class("alert").text("Customer added"));
//!
//! let mut runtime = test_runtime(dom, MockHost::default());
//! assert_eq!(runtime.bootstrap().map(|report| report.alerts), Some(1));
//! # }
//! ```

pub use loandesk_pages::*;
