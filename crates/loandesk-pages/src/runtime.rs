//! Page runtime
//!
//! Owns the document, the host, both widget libraries and every piece of
//! page state, and is the single entry point for events and timer ticks.
//! Everything runs on one thread in arrival order; delays are tasks on a
//! virtual [`TimerQueue`] that the platform (or a test) advances.

use std::time::Duration;

use loandesk_core::dom::Dom;
use loandesk_core::numeric::NumberFormat;
use loandesk_core::patch::{DomPatch, apply_patches};
use loandesk_core::timers::{TimerId, TimerQueue};
use loandesk_core::{debug_log, info_log};
use loandesk_forms::numeric_input::{on_input, validate_field};
use loandesk_forms::{
	DerivedFieldUpdater, FieldState, SubmissionGuard, SubmissionTicket, SubmitDecision,
	validate_date_field,
};
use loandesk_widgets::{
	AvailabilityProbe, DeferredInit, GridLibrary, InitOutcome, SelectLibrary,
	WidgetLifecycleManager,
};

use crate::animation::{hover_drop_patches, hover_lift_patches, revealed_patches};
use crate::callback::Callback;
use crate::dropdowns::SelectChange;
use crate::errors::{ErrorDisposition, ErrorLog, UncaughtError};
use crate::events::{Dispatch, EventBinding, EventRegistry, EventType, Handler, PageEvent};
use crate::host::Host;
use crate::notices::dismiss_patches;
use crate::settings::Settings;

/// Deferred work
#[derive(Debug, Clone, PartialEq)]
pub enum Task<N> {
	/// Fallback exit from the Submitting state
	ResetSubmission { form: N, ticket: SubmissionTicket },
	/// Fallback run of a parked grid initialization
	InitDeferredGrid(DeferredInit),
	DismissAlert(N),
	/// End of an entrance animation delay
	Reveal(N),
	RetrySelects,
	ReinitCustomerTable,
}

/// Page state and the event/timer entry points
pub struct PageRuntime<D: Dom, H, G, S> {
	pub(crate) dom: D,
	pub(crate) host: H,
	pub(crate) grid: G,
	pub(crate) select: S,
	pub(crate) settings: Settings,
	pub(crate) format: NumberFormat,
	pub(crate) guard: SubmissionGuard,
	pub(crate) updater: DerivedFieldUpdater,
	pub(crate) widgets: WidgetLifecycleManager,
	pub(crate) timers: TimerQueue<Task<D::Node>>,
	pub(crate) events: EventRegistry<D::Node>,
	pub(crate) errors: ErrorLog,
	pub(crate) select_probe: AvailabilityProbe,
	pub(crate) select_change: Option<Callback<SelectChange<D::Node>>>,
	pub(crate) unnamed_tables: usize,
	pub(crate) bootstrapped: bool,
}

impl<D: Dom, H, G, S> std::fmt::Debug for PageRuntime<D, H, G, S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PageRuntime")
			.field("now", &self.timers.now())
			.field("pending_tasks", &self.timers.len())
			.field("bindings", &self.events.len())
			.field("bootstrapped", &self.bootstrapped)
			.finish_non_exhaustive()
	}
}

impl<D, H, G, S> PageRuntime<D, H, G, S>
where
	D: Dom,
	H: Host<D::Node>,
	G: GridLibrary<D>,
	S: SelectLibrary<D>,
{
	pub fn new(dom: D, host: H, grid: G, select: S, settings: Settings) -> Self {
		let format = settings.number_format();
		let select_probe = AvailabilityProbe::new(
			"select",
			settings.timing.select_retry_attempts,
			settings.timing.select_retry(),
		);
		Self {
			dom,
			host,
			grid,
			select,
			guard: SubmissionGuard::new(),
			updater: DerivedFieldUpdater::new(format.clone()),
			format,
			settings,
			widgets: WidgetLifecycleManager::new(),
			timers: TimerQueue::new(),
			events: EventRegistry::new(),
			errors: ErrorLog::new(),
			select_probe,
			select_change: None,
			unnamed_tables: 0,
			bootstrapped: false,
		}
	}

	pub fn dom(&self) -> &D {
		&self.dom
	}

	pub fn dom_mut(&mut self) -> &mut D {
		&mut self.dom
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	pub fn grid_library(&self) -> &G {
		&self.grid
	}

	pub fn grid_library_mut(&mut self) -> &mut G {
		&mut self.grid
	}

	pub fn select_library(&self) -> &S {
		&self.select
	}

	pub fn select_library_mut(&mut self) -> &mut S {
		&mut self.select
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	pub fn number_format(&self) -> &NumberFormat {
		&self.format
	}

	pub fn widgets(&self) -> &WidgetLifecycleManager {
		&self.widgets
	}

	pub fn events(&self) -> &EventRegistry<D::Node> {
		&self.events
	}

	pub fn errors(&self) -> &ErrorLog {
		&self.errors
	}

	pub fn is_bootstrapped(&self) -> bool {
		self.bootstrapped
	}

	/// Time elapsed on the runtime clock
	pub fn now(&self) -> Duration {
		self.timers.now()
	}

	pub fn pending_tasks(&self) -> Vec<&Task<D::Node>> {
		self.timers.pending().collect()
	}

	/// Delay until the next task is due
	pub fn next_due_in(&self) -> Option<Duration> {
		self.timers.next_due_in()
	}

	pub fn schedule(&mut self, delay: Duration, task: Task<D::Node>) -> TimerId {
		self.timers.schedule(delay, task)
	}

	/// Moves the clock forward by `by`, running every task that falls due
	///
	/// Tasks scheduled while advancing run too if they fall inside the window.
	/// Returns the number of tasks run.
	pub fn advance(&mut self, by: Duration) -> usize {
		let target = self.timers.now() + by;
		let mut ran = 0;
		while let Some(task) = self.timers.pop_due(target.saturating_sub(self.timers.now())) {
			self.run_task(task);
			ran += 1;
		}
		self.timers
			.advance_clock(target.saturating_sub(self.timers.now()));
		ran
	}

	/// Registers a handler from another page script
	///
	/// `event` is `type` or `type.namespace`; unknown event types are
	/// rejected.
	pub fn on(
		&mut self,
		node: &D::Node,
		event: &str,
		callback: Callback<PageEvent<D::Node>>,
	) -> bool {
		let Some(parsed) = PageEvent::parse(event, node.clone()) else {
			return false;
		};
		let mut binding = EventBinding::new(parsed.kind, Handler::Custom(callback));
		if let Some(namespace) = parsed.namespace {
			binding = binding.namespace(namespace);
		}
		self.events.register(&mut self.dom, node, binding);
		true
	}

	/// Routes `event` to every handler bound to its target
	pub fn dispatch(&mut self, event: PageEvent<D::Node>) -> Dispatch {
		let handlers = self.events.handlers_for(&event);
		handlers
			.into_iter()
			.fold(Dispatch::Ignored, |result, handler| {
				result.merge(self.run_handler(&handler, &event))
			})
	}

	/// Dispatches the event named `name` (`type` or `type.namespace`)
	///
	/// Scripts outside the runtime hear about it through [`Host::fire`].
	pub fn trigger(&mut self, node: &D::Node, name: &str) -> Dispatch {
		let result = match PageEvent::parse(name, node.clone()) {
			Some(event) => self.dispatch(event),
			None => Dispatch::Ignored,
		};
		self.host.fire(node, name);
		result
	}

	/// Completion signal: ends the Submitting state of `form` now
	pub fn complete_submission(&mut self, form: &D::Node) -> bool {
		self.guard.reset(&mut self.dom, form, None)
	}

	/// Completion signal: the container's DOM has settled, so a parked grid
	/// initialization may run now
	pub fn notify_settled(&mut self, container_id: &str) -> Option<InitOutcome> {
		self.widgets
			.settle(&mut self.dom, &mut self.grid, container_id)
	}

	pub fn report_error(&mut self, error: UncaughtError) -> ErrorDisposition {
		self.errors.capture(error)
	}

	pub fn report_rejection(&mut self, reason: impl Into<String>) -> ErrorDisposition {
		self.errors.capture(UncaughtError::Rejection(reason.into()))
	}

	fn run_handler(&mut self, handler: &Handler<D::Node>, event: &PageEvent<D::Node>) -> Dispatch {
		let target = &event.target;
		match handler {
			Handler::ValidateNumeric => {
				self.validate_numeric_field(target);
			}
			Handler::NumericInput => {
				on_input(&mut self.dom, target);
				self.update_calculations(target);
			}
			Handler::ValidateDate => {
				if self.validate_date_input(target).is_valid() {
					self.update_calculations(target);
				}
			}
			Handler::GuardSubmit => return self.handle_submission(target),
			Handler::HoverLift => apply_patches(&mut self.dom, target, &hover_lift_patches()),
			Handler::HoverDrop => apply_patches(&mut self.dom, target, &hover_drop_patches()),
			Handler::OpenModal(modal) => {
				if self.dom.is_connected(modal) {
					self.host.show_modal(modal);
				}
			}
			Handler::SelectPicked => self.on_select_picked(target),
			Handler::Custom(callback) => callback.call(event.clone()),
		}
		Dispatch::Handled
	}

	/// Validates a numeric field and renders its state
	pub fn validate_numeric_field(&mut self, field: &D::Node) -> FieldState {
		validate_field(&mut self.dom, field)
	}

	/// Validates a date field, asking the host to confirm far-future dates
	pub fn validate_date_input(&mut self, field: &D::Node) -> FieldState {
		let today = self.host.today();
		let host = &mut self.host;
		validate_date_field(&mut self.dom, field, today, |prompt| host.confirm(prompt))
	}

	/// Recomputes the derived fields of the form `field` belongs to
	pub fn update_calculations(&mut self, field: &D::Node) {
		self.updater.on_field_edit(&mut self.dom, field);
	}

	/// Runs the submission guard on `form`
	pub fn handle_submission(&mut self, form: &D::Node) -> Dispatch {
		match self.guard.on_submit(&mut self.dom, form) {
			SubmitDecision::Proceed(ticket) => {
				let delay = self.settings.timing.submit_reset();
				self.schedule(
					delay,
					Task::ResetSubmission {
						form: form.clone(),
						ticket,
					},
				);
				Dispatch::Handled
			}
			SubmitDecision::Blocked(reason) => {
				debug_log!("Submit blocked: {:?}", reason);
				Dispatch::PreventDefault
			}
		}
	}

	fn run_task(&mut self, task: Task<D::Node>) {
		match task {
			Task::ResetSubmission { form, ticket } => {
				self.guard.reset(&mut self.dom, &form, Some(ticket));
			}
			Task::InitDeferredGrid(token) => {
				if let Some(outcome) =
					self.widgets
						.run_deferred(&mut self.dom, &mut self.grid, &token)
				{
					info_log!("Deferred initialization of {}: {:?}", token.container_id, outcome);
				}
			}
			Task::DismissAlert(alert) => apply_patches(&mut self.dom, &alert, &dismiss_patches()),
			Task::Reveal(node) => {
				let duration = self.settings.timing.fade_duration();
				apply_patches(&mut self.dom, &node, &revealed_patches(duration));
			}
			Task::RetrySelects => {
				self.init_dropdowns();
			}
			Task::ReinitCustomerTable => {
				self.init_customer_table();
			}
		}
	}

	/// Applies `patches` to `node`
	pub fn apply(&mut self, node: &D::Node, patches: &[DomPatch]) {
		apply_patches(&mut self.dom, node, patches);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{MockHost, TestRuntime, test_runtime};
	use loandesk_core::dom::{MemoryDom, NodeId, el};
	use loandesk_forms::{INVALID_CLASS, LOADING_CLASS};
	use rstest::{fixture, rstest};
	use std::sync::{Arc, Mutex};

	#[fixture]
	fn form_page() -> (TestRuntime, NodeId, NodeId) {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let form = dom.append(
			body,
			el("form")
				.child(el("div").child(el("input").id("amount").attr("type", "number")))
				.child(el("button").attr("type", "submit").text("Save")),
		);
		let input = dom.get_element_by_id("amount").unwrap();
		let mut runtime = test_runtime(dom, MockHost::default());
		runtime.wire_forms();
		(runtime, form, input)
	}

	#[rstest]
	fn test_submit_resets_after_timeout(form_page: (TestRuntime, NodeId, NodeId)) {
		let (mut runtime, form, _) = form_page;
		assert_eq!(runtime.dispatch(PageEvent::new(EventType::Submit, form)), Dispatch::Handled);
		assert!(runtime.dom().has_class(&form, LOADING_CLASS));
		assert_eq!(
			runtime.dispatch(PageEvent::new(EventType::Submit, form)),
			Dispatch::PreventDefault
		);

		runtime.advance(Duration::from_millis(4999));
		assert!(runtime.dom().has_class(&form, LOADING_CLASS));
		runtime.advance(Duration::from_millis(1));
		assert!(!runtime.dom().has_class(&form, LOADING_CLASS));
		assert_eq!(runtime.now(), Duration::from_millis(5000));
	}

	#[rstest]
	fn test_completion_signal_makes_fallback_stale(form_page: (TestRuntime, NodeId, NodeId)) {
		let (mut runtime, form, _) = form_page;
		runtime.dispatch(PageEvent::new(EventType::Submit, form));
		runtime.advance(Duration::from_millis(1000));
		assert!(runtime.complete_submission(&form));

		// a second submission must not be cut short by the first fallback
		runtime.dispatch(PageEvent::new(EventType::Submit, form));
		runtime.advance(Duration::from_millis(4000));
		assert!(runtime.dom().has_class(&form, LOADING_CLASS));
		runtime.advance(Duration::from_millis(1000));
		assert!(!runtime.dom().has_class(&form, LOADING_CLASS));
	}

	#[rstest]
	fn test_invalid_field_blocks_submit(form_page: (TestRuntime, NodeId, NodeId)) {
		let (mut runtime, form, input) = form_page;
		runtime.dom_mut().set_value(&input, "-5");
		assert_eq!(
			runtime.dispatch(PageEvent::new(EventType::Submit, form)),
			Dispatch::PreventDefault
		);
		assert!(runtime.dom().has_class(&input, INVALID_CLASS));
		assert!(!runtime.dom().has_class(&form, LOADING_CLASS));
		assert!(runtime.pending_tasks().is_empty());
	}

	#[rstest]
	fn test_blur_then_input(form_page: (TestRuntime, NodeId, NodeId)) {
		let (mut runtime, _, input) = form_page;
		runtime.dom_mut().set_value(&input, "abc");
		runtime.dispatch(PageEvent::new(EventType::Blur, input));
		assert!(runtime.dom().has_class(&input, INVALID_CLASS));
		runtime.dom_mut().set_value(&input, "5");
		runtime.dispatch(PageEvent::new(EventType::Input, input));
		assert!(!runtime.dom().has_class(&input, INVALID_CLASS));
	}

	#[rstest]
	fn test_custom_handlers_and_triggers(form_page: (TestRuntime, NodeId, NodeId)) {
		let (mut runtime, _, input) = form_page;
		let seen = Arc::new(Mutex::new(Vec::new()));
		let record = Callback::new({
			let seen = Arc::clone(&seen);
			move |event: PageEvent<NodeId>| {
				seen.lock().unwrap().push(event.namespace.unwrap_or_default());
			}
		});
		assert!(runtime.on(&input, "change.original", record.clone()));
		assert!(!runtime.on(&input, "wheel", record));

		assert_eq!(runtime.trigger(&input, "change"), Dispatch::Handled);
		assert_eq!(runtime.trigger(&input, "change.original"), Dispatch::Handled);
		assert_eq!(runtime.trigger(&input, "change.other"), Dispatch::Ignored);
		assert_eq!(*seen.lock().unwrap(), vec!["".to_string(), "original".to_string()]);
	}

	#[rstest]
	fn test_errors_captured_after_install(form_page: (TestRuntime, NodeId, NodeId)) {
		let (mut runtime, _, _) = form_page;
		assert_eq!(runtime.report_rejection("early"), ErrorDisposition::Propagated);
		runtime.errors.install();
		assert_eq!(runtime.report_rejection("late"), ErrorDisposition::Suppressed);
		assert_eq!(runtime.errors().captured().len(), 1);
	}
}
