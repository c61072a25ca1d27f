//! Error status for retry decisions

use std::fmt;

/// Whether an operation that failed with this error is worth repeating.
///
/// The builders never retry on their own. The status is for callers that
/// poll an explorer backend on a refresh timer:
/// - `Permanent`: the snapshot itself is wrong, refetching the same data won't help
/// - `Temporary`: the backend was unreachable or slow, the next refresh may succeed
/// - `Persistent`: was temporary but kept failing, surface it to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorStatus {
    /// Examples: MalformedSnapshot, MissingLocalNode, FileNotFound
    #[default]
    Permanent,

    /// Examples: Timeout, FetchFailed, IoFailed
    Temporary,

    /// Temporary error that outlived the caller's retry budget.
    Persistent,
}

impl ErrorStatus {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorStatus::Temporary)
    }

    /// Promote a temporary status once retries are exhausted.
    pub fn persist(self) -> Self {
        match self {
            ErrorStatus::Temporary => ErrorStatus::Persistent,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorStatus::Permanent => "permanent",
            ErrorStatus::Temporary => "temporary",
            ErrorStatus::Persistent => "persistent",
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
