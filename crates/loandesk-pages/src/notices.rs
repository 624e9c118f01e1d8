//! Notification banners and tooltips

use loandesk_core::dom::{Dom, Selector};
use loandesk_core::patch::DomPatch;
use loandesk_widgets::{GridLibrary, SelectLibrary};

use crate::host::Host;
use crate::runtime::{PageRuntime, Task};

/// Banners carrying this class stay until closed by hand
pub const PERMANENT_ALERT_CLASS: &str = "alert-permanent";

/// Banners that dismiss themselves
pub fn transient_alerts() -> Selector {
	Selector::class("alert").not_class(PERMANENT_ALERT_CLASS)
}

pub fn tooltip_triggers() -> Selector {
	Selector::attr_eq("data-bs-toggle", "tooltip")
}

/// Final state of a faded-out banner
pub fn dismiss_patches() -> Vec<DomPatch> {
	vec![DomPatch::set_style("display", "none")]
}

impl<D, H, G, S> PageRuntime<D, H, G, S>
where
	D: Dom,
	H: Host<D::Node>,
	G: GridLibrary<D>,
	S: SelectLibrary<D>,
{
	/// Schedules the dismissal of every transient banner
	pub fn schedule_alert_dismissal(&mut self) -> usize {
		let alerts = self.dom.select_all(&transient_alerts());
		let delay = self.settings.timing.alert_dismiss();
		for alert in &alerts {
			self.schedule(delay, Task::DismissAlert(alert.clone()));
		}
		alerts.len()
	}

	/// Hands tooltip triggers to the host's tooltip widget, if loaded
	pub fn init_tooltips(&mut self) -> usize {
		if !self.host.tooltips_available() {
			return 0;
		}
		let triggers = self.dom.select_all(&tooltip_triggers());
		for trigger in &triggers {
			self.host.init_tooltip(trigger);
		}
		triggers.len()
	}
}
