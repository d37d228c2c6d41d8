//! Unified error types for the conmon workspace.
//!
//! Per-cycle errors (`SnapshotUnavailable`) are contained by the monitor,
//! operator-facing errors (`ProcessNotFound`, `SignalDenied`) are rendered
//! as status messages, and `Config` errors stop the program before the
//! polling task starts.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ProcessId;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ConmonError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// The socket table could not be read this cycle.
    #[error("socket snapshot unavailable: {reason}")]
    SnapshotUnavailable {
        /// Why the snapshot source failed.
        reason: String,
    },

    /// No process exists with the given id.
    #[error("process {pid} not found")]
    ProcessNotFound {
        /// The process that could not be resolved.
        pid: ProcessId,
    },

    /// The operating system refused to deliver a signal.
    #[error("signal to process {pid} denied: {message}")]
    SignalDenied {
        /// The process that could not be signalled.
        pid: ProcessId,
        /// Description returned by the operating system.
        message: String,
    },
}

impl ConmonError {
    /// Short reason code shown next to operator-facing failures.
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Config { .. } => "config",
            Self::SnapshotUnavailable { .. } => "snapshot-unavailable",
            Self::ProcessNotFound { .. } => "process-not-found",
            Self::SignalDenied { .. } => "signal-denied",
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ConmonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_not_found_mentions_pid() {
        let err = ConmonError::ProcessNotFound {
            pid: ProcessId::new(4242),
        };
        assert_eq!(err.to_string(), "process 4242 not found");
        assert_eq!(err.reason_code(), "process-not-found");
    }

    #[test]
    fn signal_denied_carries_os_message() {
        let err = ConmonError::SignalDenied {
            pid: ProcessId::new(1),
            message: "EPERM: Operation not permitted".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("process 1"), "got: {msg}");
        assert!(msg.contains("EPERM"), "got: {msg}");
    }

    #[test]
    fn reason_codes_are_distinct() {
        let errors = [
            ConmonError::Io {
                path: PathBuf::from("/proc/net/tcp"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            },
            ConmonError::Config {
                message: "grace_ticks must be at least 1".into(),
            },
            ConmonError::SnapshotUnavailable {
                reason: "table busy".into(),
            },
            ConmonError::ProcessNotFound {
                pid: ProcessId::new(7),
            },
            ConmonError::SignalDenied {
                pid: ProcessId::new(7),
                message: "EPERM".into(),
            },
        ];
        let codes: std::collections::HashSet<&str> = errors.iter().map(ConmonError::reason_code).collect();
        assert_eq!(codes.len(), errors.len());
    }
}
