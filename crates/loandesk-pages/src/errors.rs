//! Global error capture
//!
//! Once installed, uncaught script errors and unhandled promise rejections
//! are logged and suppressed instead of reaching the browser's default
//! reporting. Nothing captured here stops the page.

use loandesk_core::error_log;

/// An error that escaped every handler
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum UncaughtError {
	#[error("JavaScript Error: {message} ({filename}:{line}:{column})")]
	Script {
		message: String,
		filename: String,
		line: u32,
		column: u32,
	},

	#[error("Unhandled Promise Rejection: {0}")]
	Rejection(String),
}

/// What the browser adapter does with the original error event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDisposition {
	/// Cancel the event's default reporting
	Suppressed,
	/// Capture is not installed; leave the event alone
	Propagated,
}

/// Log of captured errors
#[derive(Debug, Default)]
pub struct ErrorLog {
	installed: bool,
	captured: Vec<UncaughtError>,
}

impl ErrorLog {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn install(&mut self) {
		self.installed = true;
	}

	pub fn is_installed(&self) -> bool {
		self.installed
	}

	pub fn capture(&mut self, error: UncaughtError) -> ErrorDisposition {
		if !self.installed {
			return ErrorDisposition::Propagated;
		}
		error_log!("{}", error);
		self.captured.push(error);
		ErrorDisposition::Suppressed
	}

	pub fn captured(&self) -> &[UncaughtError] {
		&self.captured
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_capture_requires_install() {
		let mut log = ErrorLog::new();
		let rejection = UncaughtError::Rejection("timeout".into());
		assert_eq!(log.capture(rejection.clone()), ErrorDisposition::Propagated);
		assert!(log.captured().is_empty());

		log.install();
		assert_eq!(log.capture(rejection.clone()), ErrorDisposition::Suppressed);
		assert_eq!(log.captured(), &[rejection]);
	}

	#[rstest]
	fn test_messages() {
		let error = UncaughtError::Script {
			message: "x is undefined".into(),
			filename: "app.js".into(),
			line: 12,
			column: 4,
		};
		assert_eq!(error.to_string(), "JavaScript Error: x is undefined (app.js:12:4)");
		assert_eq!(
			UncaughtError::Rejection("boom".into()).to_string(),
			"Unhandled Promise Rejection: boom"
		);
	}
}
