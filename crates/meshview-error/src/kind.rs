//! Error kinds for meshview operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// Callers match on `ErrorKind` to pick a fallback, e.g. keep the last
/// rendered graph on screen when a snapshot cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// The requested feature or operation is not supported
    Unsupported,

    /// Invalid configuration or parameters
    ConfigInvalid,

    /// Invalid argument passed to function
    InvalidArgument,

    // =========================================================================
    // Snapshot errors
    // =========================================================================
    /// Input is not a well-formed sequence of peer nodes
    MalformedSnapshot,

    /// No node in the snapshot is marked as the local participant
    MissingLocalNode,

    /// More than one node in the snapshot is marked as the local participant
    AmbiguousLocalNode,

    /// A node lists itself as a peer while self-loops are rejected
    SelfLoop,

    // =========================================================================
    // Fetch errors
    // =========================================================================
    /// Request to the explorer backend failed or returned a non-success status
    FetchFailed,

    /// Timeout occurred
    Timeout,

    // =========================================================================
    // File/IO errors
    // =========================================================================
    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,

    // =========================================================================
    // Serialization errors
    // =========================================================================
    /// Serialization failed
    SerializationFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Check if this error kind is retryable by default
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::FetchFailed | ErrorKind::IoFailed
        )
    }

    /// Check if this error was raised while validating or building from a snapshot
    pub fn is_snapshot_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::MalformedSnapshot
                | ErrorKind::MissingLocalNode
                | ErrorKind::AmbiguousLocalNode
                | ErrorKind::SelfLoop
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::MalformedSnapshot.to_string(), "MalformedSnapshot");
        assert_eq!(ErrorKind::MissingLocalNode.as_str(), "MissingLocalNode");
    }

    #[test]
    fn test_is_retryable() {
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(ErrorKind::FetchFailed.is_retryable());
        assert!(!ErrorKind::MalformedSnapshot.is_retryable());
        assert!(!ErrorKind::AmbiguousLocalNode.is_retryable());
    }

    #[test]
    fn test_snapshot_errors() {
        assert!(ErrorKind::SelfLoop.is_snapshot_error());
        assert!(ErrorKind::MissingLocalNode.is_snapshot_error());
        assert!(!ErrorKind::FetchFailed.is_snapshot_error());
    }
}
