//! [`Host`] over the browser window

use chrono::NaiveDate;
use loandesk_core::warn_log;
use url::Url;
use wasm_bindgen::JsValue;
use web_sys::{Element, Window};

use super::js::{Modal, Tooltip, describe, global_path, jquery};
use crate::host::Host;

/// The browser window and the UI toolkit loaded into it
#[derive(Debug, Clone)]
pub struct BrowserHost {
	window: Window,
	location: Url,
}

impl BrowserHost {
	/// `None` outside a browsing context or on an unreadable address
	pub fn from_window() -> Option<Self> {
		let window = web_sys::window()?;
		let href = window.location().href().ok()?;
		let location = Url::parse(&href).ok()?;
		Some(Self { window, location })
	}
}

impl Host<Element> for BrowserHost {
	fn confirm(&mut self, message: &str) -> bool {
		self.window.confirm_with_message(message).unwrap_or(false)
	}

	fn today(&self) -> NaiveDate {
		let now = js_sys::Date::new_0();
		NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
			.unwrap_or_default()
	}

	fn location(&self) -> Url {
		self.window
			.location()
			.href()
			.ok()
			.and_then(|href| Url::parse(&href).ok())
			.unwrap_or_else(|| self.location.clone())
	}

	fn replace_history(&mut self, url: &Url) {
		let replaced = self.window.history().and_then(|history| {
			history.replace_state_with_url(&JsValue::NULL, "", Some(url.as_str()))
		});
		match replaced {
			Ok(()) => self.location = url.clone(),
			Err(err) => warn_log!("History replacement failed: {}", describe(&err)),
		}
	}

	fn show_modal(&mut self, modal: &Element) {
		match Modal::new(modal) {
			Ok(dialog) => dialog.show(),
			Err(err) => warn_log!("Modal could not be opened: {}", describe(&err)),
		}
	}

	fn tooltips_available(&self) -> bool {
		global_path(&["bootstrap", "Tooltip"]).is_some()
	}

	fn init_tooltip(&mut self, element: &Element) {
		if let Err(err) = Tooltip::new(element) {
			warn_log!("Tooltip initialization failed: {}", describe(&err));
		}
	}

	fn fire(&mut self, target: &Element, event: &str) {
		if global_path(&["jQuery"]).is_none() {
			return;
		}
		if let Err(err) = jquery(target).and_then(|node| node.trigger(event)) {
			warn_log!("Triggering '{}' failed: {}", event, describe(&err));
		}
	}
}
