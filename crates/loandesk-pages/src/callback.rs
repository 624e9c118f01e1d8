//! Callback type for handlers supplied by other page scripts
//!
//! ## Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use loandesk_pages::Callback;
//!
//! let picks = Arc::new(AtomicUsize::new(0));
//! let on_pick = Callback::new({
//! 	let picks = Arc::clone(&picks);
//! 	move |_: &str| {
//! 		picks.fetch_add(1, Ordering::SeqCst);
//! 	}
//! });
//! on_pick.call("42");
//! on_pick.clone().call("7");
//! assert_eq!(picks.load(Ordering::SeqCst), 2);
//! ```

use std::fmt;
use std::sync::Arc;

/// Bound every handler function satisfies
///
/// Browser handlers may hold JS values and stay on the one thread; native
/// handlers must be shareable across threads.
#[cfg(target_arch = "wasm32")]
pub trait HandlerFn<Args, Ret>: Fn(Args) -> Ret + 'static {}
#[cfg(target_arch = "wasm32")]
impl<Args, Ret, F: Fn(Args) -> Ret + 'static> HandlerFn<Args, Ret> for F {}

#[cfg(not(target_arch = "wasm32"))]
pub trait HandlerFn<Args, Ret>: Fn(Args) -> Ret + Send + Sync + 'static {}
#[cfg(not(target_arch = "wasm32"))]
impl<Args, Ret, F: Fn(Args) -> Ret + Send + Sync + 'static> HandlerFn<Args, Ret> for F {}

/// A cloneable, shared handler; clones compare equal to their source
pub struct Callback<Args, Ret = ()>(Arc<dyn HandlerFn<Args, Ret>>);

impl<Args, Ret> Callback<Args, Ret> {
	pub fn new(f: impl HandlerFn<Args, Ret>) -> Self {
		Self(Arc::new(f))
	}

	pub fn call(&self, args: Args) -> Ret {
		(self.0)(args)
	}
}

impl<Args, Ret> Clone for Callback<Args, Ret> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}

impl<Args, Ret> fmt::Debug for Callback<Args, Ret> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Callback(<function>)")
	}
}

impl<Args, Ret> PartialEq for Callback<Args, Ret> {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::Mutex;

	#[rstest]
	fn test_clones_share_function() {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let callback = Callback::new({
			let seen = Arc::clone(&seen);
			move |value: u32| seen.lock().unwrap().push(value)
		});
		let copy = callback.clone();
		callback.call(1);
		copy.call(2);
		assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
		assert_eq!(callback, copy);
	}

	#[rstest]
	fn test_distinct_callbacks_differ() {
		let a: Callback<(), u8> = Callback::new(|()| 1);
		let b: Callback<(), u8> = Callback::new(|()| 1);
		assert_ne!(a, b);
		assert_eq!(a.call(()), 1);
		assert_eq!(format!("{a:?}"), "Callback(<function>)");
	}
}
