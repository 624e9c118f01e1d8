//! Widget error types

/// Failure reported by a grid or select library
///
/// These never escape [`WidgetLifecycleManager`](crate::lifecycle::WidgetLifecycleManager):
/// they are logged and turned into a degraded outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum WidgetError {
	#[error("{0} library is not loaded")]
	LibraryUnavailable(&'static str),

	#[error("failed to create widget on '{target}': {reason}")]
	CreateFailed { target: String, reason: String },

	#[error("failed to tear down widget on '{target}': {reason}")]
	DestroyFailed { target: String, reason: String },

	#[error("no widget bound to '{0}'")]
	NotBound(String),
}

pub type WidgetResult<T> = Result<T, WidgetError>;
