//! Test support: a scripted host and a ready-made in-memory runtime
//!
//! ```
//! use loandesk_core::dom::{MemoryDom, el};
//! use loandesk_pages::testing::{MockHost, test_runtime};
//!
//! let mut dom = MemoryDom::new();
//! let body = dom.body();
//! dom.append(body, el("div").class("alert").text("Saved"));
//!
//! let mut runtime = test_runtime(dom, MockHost::default());
//! let report = runtime.bootstrap().unwrap();
//! assert_eq!(report.alerts, 1);
//! ```

use std::collections::VecDeque;

use chrono::NaiveDate;
use loandesk_core::dom::{MemoryDom, NodeId};
use loandesk_widgets::testing::{FakeGridLibrary, FakeSelectLibrary};
use url::Url;

use crate::host::Host;
use crate::runtime::PageRuntime;
use crate::settings::Settings;

pub const DEFAULT_LOCATION: &str = "https://loandesk.test/";

/// Host with scripted answers that records what the page asked of it
#[derive(Debug, Clone)]
pub struct MockHost<N> {
	confirms: VecDeque<bool>,
	prompts: Vec<String>,
	today: NaiveDate,
	location: Url,
	history: Vec<Url>,
	modals: Vec<N>,
	tooltips_available: bool,
	tooltips: Vec<N>,
	fired: Vec<(N, String)>,
}

impl<N> Default for MockHost<N> {
	fn default() -> Self {
		Self {
			confirms: VecDeque::new(),
			prompts: Vec::new(),
			today: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap_or_default(),
			location: Url::parse(DEFAULT_LOCATION).expect("default location is a valid URL"),
			history: Vec::new(),
			modals: Vec::new(),
			tooltips_available: true,
			tooltips: Vec::new(),
			fired: Vec::new(),
		}
	}
}

impl<N> MockHost<N> {
	/// Starts the page at `url`
	pub fn at(mut self, url: &str) -> Self {
		self.location = Url::parse(url).expect("test location must be a valid URL");
		self
	}

	pub fn with_today(mut self, today: NaiveDate) -> Self {
		self.today = today;
		self
	}

	pub fn with_tooltips(mut self, available: bool) -> Self {
		self.tooltips_available = available;
		self
	}

	/// Queues the answer to the next confirmation; unanswered prompts
	/// are accepted
	pub fn push_confirm(&mut self, answer: bool) {
		self.confirms.push_back(answer);
	}

	pub fn prompts(&self) -> &[String] {
		&self.prompts
	}

	pub fn history(&self) -> &[Url] {
		&self.history
	}

	pub fn modals(&self) -> &[N] {
		&self.modals
	}

	pub fn tooltips(&self) -> &[N] {
		&self.tooltips
	}

	/// Events announced to outside scripts, in order
	pub fn fired(&self) -> &[(N, String)] {
		&self.fired
	}
}

impl<N: Clone> Host<N> for MockHost<N> {
	fn confirm(&mut self, message: &str) -> bool {
		self.prompts.push(message.to_string());
		self.confirms.pop_front().unwrap_or(true)
	}

	fn today(&self) -> NaiveDate {
		self.today
	}

	fn location(&self) -> Url {
		self.location.clone()
	}

	fn replace_history(&mut self, url: &Url) {
		self.location = url.clone();
		self.history.push(url.clone());
	}

	fn show_modal(&mut self, modal: &N) {
		self.modals.push(modal.clone());
	}

	fn tooltips_available(&self) -> bool {
		self.tooltips_available
	}

	fn init_tooltip(&mut self, element: &N) {
		self.tooltips.push(element.clone());
	}

	fn fire(&mut self, target: &N, event: &str) {
		self.fired.push((target.clone(), event.to_string()));
	}
}

/// Runtime over the in-memory document and the fake widget libraries
pub type TestRuntime = PageRuntime<
	MemoryDom,
	MockHost<NodeId>,
	FakeGridLibrary<NodeId>,
	FakeSelectLibrary<NodeId>,
>;

/// Runtime with default settings and available widget libraries
pub fn test_runtime(dom: MemoryDom, host: MockHost<NodeId>) -> TestRuntime {
	PageRuntime::new(
		dom,
		host,
		FakeGridLibrary::new(),
		FakeSelectLibrary::new(),
		Settings::default(),
	)
}
