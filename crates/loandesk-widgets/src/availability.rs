//! Bounded polling for late-loading widget libraries
//!
//! Widget scripts may still be loading when the page bootstraps. A probe is
//! checked once immediately and then retried a fixed number of times before
//! the enhancement is given up.

use std::time::Duration;

/// What to do after checking a library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
	Ready,
	RetryAfter(Duration),
	GiveUp,
}

/// Retry budget for one library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityProbe {
	name: &'static str,
	retries_left: u32,
	delay: Duration,
}

impl AvailabilityProbe {
	pub fn new(name: &'static str, retries: u32, delay: Duration) -> Self {
		Self {
			name,
			retries_left: retries,
			delay,
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn retries_left(&self) -> u32 {
		self.retries_left
	}

	/// Records one check of the library
	pub fn check(&mut self, available: bool) -> Poll {
		if available {
			return Poll::Ready;
		}
		if self.retries_left == 0 {
			return Poll::GiveUp;
		}
		self.retries_left -= 1;
		Poll::RetryAfter(self.delay)
	}
}
