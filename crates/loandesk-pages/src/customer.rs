//! Customer master page hooks
//!
//! On the customer page the "add customer" buttons open the modal, and a
//! redirect after a deletion (`?deleted=1`) rebuilds the customer grid once
//! the new rows are in place. The flag is stripped from the address bar so
//! that a reload does not repeat the rebuild.

use loandesk_core::dom::Dom;
use loandesk_core::info_log;
use loandesk_widgets::{GridLibrary, SelectLibrary};

use crate::events::{EventBinding, EventType, Handler};
use crate::host::{Host, has_flag, without_param};
use crate::runtime::{PageRuntime, Task};

pub const ADD_CUSTOMER_MODAL_ID: &str = "addCustomerModal";
/// Buttons that open the add-customer modal
pub const ADD_CUSTOMER_BUTTON_IDS: [&str; 2] = ["addCustomerBtn", "addCustomerBtnEmpty"];

/// What the customer page hook did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerPageReport {
	pub modal_buttons: usize,
	/// A deletion redirect was seen and a rebuild scheduled
	pub reinit_scheduled: bool,
}

impl<D, H, G, S> PageRuntime<D, H, G, S>
where
	D: Dom,
	H: Host<D::Node>,
	G: GridLibrary<D>,
	S: SelectLibrary<D>,
{
	/// Whether the current location is the customer page
	pub fn on_customer_page(&self) -> bool {
		self.host
			.location()
			.path()
			.contains(&self.settings.routes.customer_path_marker)
	}

	/// Runs the customer page hooks; `None` on any other page
	pub fn init_customer_page(&mut self) -> Option<CustomerPageReport> {
		if !self.on_customer_page() {
			return None;
		}
		let mut report = CustomerPageReport {
			modal_buttons: self.bind_add_customer_buttons(),
			..CustomerPageReport::default()
		};

		let location = self.host.location();
		let param = self.settings.routes.deleted_param.clone();
		if has_flag(&location, &param) {
			self.host.replace_history(&without_param(&location, &param));
			let delay = self.settings.timing.post_delete_reinit();
			self.schedule(delay, Task::ReinitCustomerTable);
			info_log!("Customer deleted, rebuilding customer table");
			report.reinit_scheduled = true;
		}
		Some(report)
	}

	fn bind_add_customer_buttons(&mut self) -> usize {
		let Some(modal) = self.dom.get_element_by_id(ADD_CUSTOMER_MODAL_ID) else {
			return 0;
		};
		let buttons = ADD_CUSTOMER_BUTTON_IDS
			.iter()
			.filter_map(|id| self.dom.get_element_by_id(id))
			.collect::<Vec<_>>();
		for button in &buttons {
			self.events.register_once(
				&mut self.dom,
				button,
				EventBinding::new(EventType::Click, Handler::OpenModal(modal.clone())),
			);
		}
		buttons.len()
	}
}
