//! Process lookup and signalling on the host.
//!
//! Children are read from `/proc/<pid>/task/<tid>/children` (kernel 3.5+),
//! falling back to a scan of every `/proc/<pid>/stat` parent field when that
//! file is unavailable.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use conmon_common::error::{ConmonError, Result};
use conmon_common::types::ProcessId;
use conmon_core::source::ProcessTree;

/// [`ProcessTree`] backed by a proc filesystem and `kill(2)`.
#[derive(Debug, Clone)]
pub struct ProcProcessTree {
    root: PathBuf,
}

impl ProcProcessTree {
    /// Inspects the host's `/proc`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(conmon_common::constants::PROC_ROOT)
    }

    /// Inspects an alternative proc root. Signals still go to the host.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn children_from_tasks(&self, pid: ProcessId) -> Option<Vec<ProcessId>> {
        let tasks = std::fs::read_dir(self.root.join(pid.to_string()).join("task")).ok()?;
        let mut children = BTreeSet::new();
        let mut any = false;
        for task in tasks.flatten() {
            let Ok(contents) = std::fs::read_to_string(task.path().join("children")) else {
                continue;
            };
            any = true;
            children.extend(
                contents
                    .split_whitespace()
                    .filter_map(|s| s.parse::<i32>().ok())
                    .map(ProcessId::new),
            );
        }
        any.then(|| children.into_iter().collect())
    }

    fn children_from_stat(&self, pid: ProcessId) -> Result<Vec<ProcessId>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| ConmonError::Io {
            path: self.root.clone(),
            source: e,
        })?;
        let mut children = Vec::new();
        for entry in entries.flatten() {
            let Some(child) = entry.file_name().to_str().and_then(|s| s.parse::<i32>().ok()) else {
                continue;
            };
            let Ok(stat) = std::fs::read_to_string(entry.path().join("stat")) else {
                continue;
            };
            if parent_pid(&stat) == Some(pid) {
                children.push(ProcessId::new(child));
            }
        }
        children.sort_unstable();
        Ok(children)
    }
}

impl Default for ProcProcessTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the parent pid from a `/proc/<pid>/stat` line.
///
/// The command name may contain spaces and parentheses, so fields are
/// counted from the last `)`.
#[must_use]
pub fn parent_pid(stat: &str) -> Option<ProcessId> {
    let rest = stat.get(stat.rfind(')')? + 1..)?;
    rest.split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<i32>().ok())
        .map(ProcessId::new)
}

fn proc_dir(root: &Path, pid: ProcessId) -> PathBuf {
    root.join(pid.to_string())
}

impl ProcessTree for ProcProcessTree {
    fn exists(&self, pid: ProcessId) -> bool {
        pid.as_raw() > 0 && proc_dir(&self.root, pid).is_dir()
    }

    fn children(&self, pid: ProcessId) -> Result<Vec<ProcessId>> {
        if let Some(children) = self.children_from_tasks(pid) {
            return Ok(children);
        }
        tracing::debug!(pid = %pid, "task children unavailable, scanning stat files");
        self.children_from_stat(pid)
    }

    fn signal(&self, pid: ProcessId) -> Result<()> {
        send_terminate(pid)
    }
}

/// Sends `SIGTERM` to a process.
///
/// # Errors
///
/// Returns `ProcessNotFound` for `ESRCH` and `SignalDenied` for every other
/// failure, `EPERM` included.
#[cfg(unix)]
pub fn send_terminate(pid: ProcessId) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    if pid.as_raw() <= 0 {
        return Err(ConmonError::ProcessNotFound { pid });
    }
    match kill(Pid::from_raw(pid.as_raw()), Signal::SIGTERM) {
        Ok(()) => {
            tracing::debug!(pid = %pid, "SIGTERM delivered");
            Ok(())
        }
        Err(Errno::ESRCH) => Err(ConmonError::ProcessNotFound { pid }),
        Err(errno) => Err(ConmonError::SignalDenied {
            pid,
            message: errno.desc().to_owned(),
        }),
    }
}

/// Stub for non-Unix platforms.
///
/// # Errors
///
/// Always returns an error: signals require a Unix host.
#[cfg(not(unix))]
pub fn send_terminate(pid: ProcessId) -> Result<()> {
    Err(ConmonError::SignalDenied {
        pid,
        message: "signals require a Unix host".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_pid_handles_spaces_and_parens_in_name() {
        let stat = "4242 (tmux: server (1)) S 1 4242 4242 0 -1 4194560 1 0 0 0";
        assert_eq!(parent_pid(stat), Some(ProcessId::new(1)));
    }

    #[test]
    fn parent_pid_rejects_truncated_stat() {
        assert_eq!(parent_pid("17 (sh"), None);
        assert_eq!(parent_pid("17 (sh) S"), None);
    }

    fn write_proc(root: &Path, pid: i32, ppid: i32, children: Option<&str>) {
        let dir = root.join(pid.to_string());
        std::fs::create_dir_all(&dir).expect("proc dir");
        std::fs::write(dir.join("stat"), format!("{pid} (worker) S {ppid} {pid} {pid} 0")).expect("stat");
        if let Some(children) = children {
            let task = dir.join("task").join(pid.to_string());
            std::fs::create_dir_all(&task).expect("task dir");
            std::fs::write(task.join("children"), children).expect("children");
        }
    }

    #[test]
    fn children_read_from_task_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_proc(dir.path(), 100, 1, Some("102 101 "));
        let tree = ProcProcessTree::with_root(dir.path());

        let children = tree.children(ProcessId::new(100)).expect("children");
        assert_eq!(children, vec![ProcessId::new(101), ProcessId::new(102)]);
    }

    #[test]
    fn children_fall_back_to_stat_scan() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_proc(dir.path(), 100, 1, None);
        write_proc(dir.path(), 201, 100, None);
        write_proc(dir.path(), 202, 100, None);
        write_proc(dir.path(), 300, 201, None);
        let tree = ProcProcessTree::with_root(dir.path());

        let children = tree.children(ProcessId::new(100)).expect("children");
        assert_eq!(children, vec![ProcessId::new(201), ProcessId::new(202)]);
    }

    #[test]
    fn exists_checks_proc_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_proc(dir.path(), 55, 1, None);
        let tree = ProcProcessTree::with_root(dir.path());

        assert!(tree.exists(ProcessId::new(55)));
        assert!(!tree.exists(ProcessId::new(56)));
        assert!(!tree.exists(ProcessId::new(0)));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn terminates_a_real_child_process() {
        use std::os::unix::process::ExitStatusExt;

        let mut child = std::process::Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("spawn sleep");
        let pid = ProcessId::new(i32::try_from(child.id()).expect("pid fits"));
        let tree = ProcProcessTree::new();

        assert!(tree.exists(pid));
        let me = ProcessId::new(i32::try_from(std::process::id()).expect("pid fits"));
        assert!(tree.children(me).expect("children").contains(&pid));

        tree.signal(pid).expect("signal");
        let status = child.wait().expect("wait");
        assert_eq!(status.signal(), Some(15));
    }

    #[cfg(unix)]
    #[test]
    fn signalling_sentinel_pid_is_refused() {
        let err = send_terminate(ProcessId::new(0)).unwrap_err();
        assert!(matches!(err, ConmonError::ProcessNotFound { .. }));
    }
}
