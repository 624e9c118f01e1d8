//! Logging layer shared by every loandesk crate
//!
//! In the browser messages go to the developer console. Natively they become
//! `tracing` events and the host application's subscriber decides where they
//! end up.
//!
//! | Macro | Browser | Native |
//! |-------|---------|--------|
//! | `debug_log!` | `console.debug` | `tracing::debug!` |
//! | `info_log!` | `console.info` | `tracing::info!` |
//! | `warn_log!` | `console.warn` | `tracing::warn!` |
//! | `error_log!` | `console.error` | `tracing::error!` |
//!
//! `debug_log!` only emits in debug builds with the `debug-logs` feature; in
//! every other build its arguments are type-checked and discarded.
//!
//! ```ignore
//! use loandesk_core::{info_log, warn_log};
//!
//! info_log!("grid ready on #{}", table_id);
//! warn_log!("grid on #{} failed: {}", table_id, err);
//! ```

#[doc(hidden)]
pub use tracing as __tracing;
#[cfg(target_arch = "wasm32")]
#[doc(hidden)]
pub use web_sys as __web_sys;

/// Sends one formatted line to the backend of the current target
#[doc(hidden)]
#[macro_export]
#[cfg(target_arch = "wasm32")]
macro_rules! __emit_log {
	(debug, $($arg:tt)*) => {
		$crate::logging::__web_sys::console::debug_1(&::std::format!($($arg)*).into())
	};
	(info, $($arg:tt)*) => {
		$crate::logging::__web_sys::console::info_1(&::std::format!($($arg)*).into())
	};
	(warn, $($arg:tt)*) => {
		$crate::logging::__web_sys::console::warn_1(&::std::format!($($arg)*).into())
	};
	(error, $($arg:tt)*) => {
		$crate::logging::__web_sys::console::error_1(&::std::format!($($arg)*).into())
	};
}

#[doc(hidden)]
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! __emit_log {
	($level:ident, $($arg:tt)*) => {
		$crate::logging::__tracing::$level!("{}", ::std::format!($($arg)*))
	};
}

#[macro_export]
#[cfg(all(debug_assertions, feature = "debug-logs"))]
macro_rules! debug_log {
	($($arg:tt)*) => {{ $crate::__emit_log!(debug, $($arg)*); }};
}

#[macro_export]
#[cfg(not(all(debug_assertions, feature = "debug-logs")))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		if false {
			let _ = ::std::format!($($arg)*);
		}
	}};
}

#[macro_export]
macro_rules! info_log {
	($($arg:tt)*) => {{ $crate::__emit_log!(info, $($arg)*); }};
}

#[macro_export]
macro_rules! warn_log {
	($($arg:tt)*) => {{ $crate::__emit_log!(warn, $($arg)*); }};
}

#[macro_export]
macro_rules! error_log {
	($($arg:tt)*) => {{ $crate::__emit_log!(error, $($arg)*); }};
}
