//! Boundaries to the operating system.
//!
//! The reconciler never reads `/proc` itself; an adapter crate implements
//! these traits for the host, and tests implement them in memory.

use conmon_common::error::Result;
use conmon_common::types::{ProcessId, SocketEntry};

/// Produces the current host socket table on demand.
pub trait SnapshotSource: Send {
    /// Returns every socket entry currently known to the host.
    ///
    /// # Errors
    ///
    /// Returns [`conmon_common::error::ConmonError::SnapshotUnavailable`]
    /// when the table cannot be read this cycle.
    fn snapshot(&mut self) -> Result<Vec<SocketEntry>>;
}

/// Process lookup and signalling.
pub trait ProcessTree: Send + Sync {
    /// Whether a process with this id currently exists.
    fn exists(&self, pid: ProcessId) -> bool;

    /// Direct children of the process, one level deep.
    ///
    /// # Errors
    ///
    /// Returns an error if the process table cannot be inspected.
    fn children(&self, pid: ProcessId) -> Result<Vec<ProcessId>>;

    /// Delivers a termination request to the process.
    ///
    /// # Errors
    ///
    /// Returns `ProcessNotFound` if the process is gone and `SignalDenied`
    /// if the operating system refuses the signal.
    fn signal(&self, pid: ProcessId) -> Result<()>;
}
