//! Process termination.
//!
//! Signals the direct children of a process and then the process itself.
//! Only one level of children is visited; grandchildren are left to their
//! parent's signal handling.

use conmon_common::error::{ConmonError, Result};
use conmon_common::types::ProcessId;
use serde::Serialize;

use crate::source::ProcessTree;

/// Outcome of a successful termination request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminationReport {
    /// Process that was signalled.
    pub pid: ProcessId,
    /// Children that accepted the signal.
    pub children_signalled: Vec<ProcessId>,
    /// Children whose signal failed.
    pub children_failed: Vec<ProcessId>,
}

/// Terminates processes through a [`ProcessTree`].
#[derive(Debug)]
pub struct Terminator<T> {
    tree: T,
}

impl<T: ProcessTree> Terminator<T> {
    /// Creates a terminator backed by the given process tree.
    pub const fn new(tree: T) -> Self {
        Self { tree }
    }

    /// Signals every direct child of `pid`, then `pid` itself.
    ///
    /// Child failures are recorded in the report but do not fail the call.
    ///
    /// # Errors
    ///
    /// Returns [`ConmonError::ProcessNotFound`] if `pid` does not exist (or
    /// exits before it is signalled) and [`ConmonError::SignalDenied`] if
    /// the operating system refuses to signal it.
    pub fn terminate(&self, pid: ProcessId) -> Result<TerminationReport> {
        if pid.is_unresolved() || !self.tree.exists(pid) {
            return Err(ConmonError::ProcessNotFound { pid });
        }

        let children = self.tree.children(pid).unwrap_or_else(|e| {
            tracing::warn!(pid = %pid, error = %e, "could not enumerate children");
            Vec::new()
        });

        let mut children_signalled = Vec::with_capacity(children.len());
        let mut children_failed = Vec::new();
        for child in children {
            match self.tree.signal(child) {
                Ok(()) => children_signalled.push(child),
                Err(e) => {
                    tracing::debug!(pid = %pid, child = %child, error = %e, "child signal failed");
                    children_failed.push(child);
                }
            }
        }

        self.tree.signal(pid)?;
        tracing::info!(
            pid = %pid,
            children = children_signalled.len(),
            failed = children_failed.len(),
            "process terminated"
        );
        Ok(TerminationReport {
            pid,
            children_signalled,
            children_failed,
        })
    }

    /// The process tree this terminator signals through.
    pub const fn tree(&self) -> &T {
        &self.tree
    }
}
