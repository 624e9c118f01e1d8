//! Virtual timer queue
//!
//! Deferred work (the submit reset, the widget settle delay, banner
//! dismissal) is expressed as tasks scheduled on a millisecond clock that only
//! moves when the owner advances it. The browser adapter advances it from
//! `setTimeout`; tests advance it directly.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle returned by [`TimerQueue::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
	now_ms: u64,
	next_order: u64,
	// (due, order) keeps ties in scheduling order
	entries: BTreeMap<(u64, u64), T>,
}

impl<T> Default for TimerQueue<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> TimerQueue<T> {
	pub fn new() -> Self {
		Self {
			now_ms: 0,
			next_order: 0,
			entries: BTreeMap::new(),
		}
	}

	/// Time elapsed on the virtual clock
	pub fn now(&self) -> Duration {
		Duration::from_millis(self.now_ms)
	}

	/// Schedules `task` to become due after `delay`
	pub fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
		let due = self.now_ms.saturating_add(delay.as_millis() as u64);
		let order = self.next_order;
		self.next_order += 1;
		self.entries.insert((due, order), task);
		TimerId(order)
	}

	/// Removes a pending task; returns it if it had not fired yet
	pub fn cancel(&mut self, id: TimerId) -> Option<T> {
		let key = self.entries.keys().find(|(_, order)| *order == id.0).copied()?;
		self.entries.remove(&key)
	}

	/// Pops the earliest task due at or before `now + within`, moving the clock
	/// to its due time
	pub fn pop_due(&mut self, within: Duration) -> Option<T> {
		let limit = self.now_ms.saturating_add(within.as_millis() as u64);
		let (&(due, order), _) = self.entries.iter().next()?;
		if due > limit {
			return None;
		}
		self.now_ms = self.now_ms.max(due);
		self.entries.remove(&(due, order))
	}

	/// Moves the clock forward without running anything
	pub fn advance_clock(&mut self, by: Duration) {
		self.now_ms = self.now_ms.saturating_add(by.as_millis() as u64);
	}

	/// Delay until the next task is due
	pub fn next_due_in(&self) -> Option<Duration> {
		self.entries
			.keys()
			.next()
			.map(|(due, _)| Duration::from_millis(due.saturating_sub(self.now_ms)))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Pending tasks in firing order
	pub fn pending(&self) -> impl Iterator<Item = &T> {
		self.entries.values()
	}
}
