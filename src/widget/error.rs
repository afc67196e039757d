//! Widget error kinds.

use std::fmt;

use crate::backend::BackendError;

/// Why a submission was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Draft was empty or whitespace only.
    Empty,
    /// A request is already in flight and single-flight is on.
    Busy,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty draft"),
            Self::Busy => f.write_str("request already in flight"),
        }
    }
}

/// Errors raised while driving a widget. None of them end the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    /// Silent no-op; never shown to the user.
    #[error("Submission ignored: {0}")]
    SubmissionIgnored(IgnoreReason),

    /// Covers transport failures, non-2xx statuses and malformed bodies.
    #[error("Chat backend unavailable: {0}")]
    BackendUnavailable(#[from] BackendError),
}
