//! `conmon kill`: terminate a process and its direct children.

use anyhow::Context;
use clap::Args;
use conmon_common::types::ProcessId;
use conmon_core::terminate::Terminator;
use conmon_sys::process::ProcProcessTree;

/// Arguments for the `kill` command.
#[derive(Args, Debug)]
pub struct KillArgs {
    /// Process ID to terminate.
    pub pid: i32,
}

/// Executes the `kill` command.
///
/// # Errors
///
/// Returns an error if the process does not exist or refuses the signal.
pub fn execute(args: &KillArgs) -> anyhow::Result<()> {
    let pid = ProcessId::new(args.pid);
    let report = Terminator::new(ProcProcessTree::new())
        .terminate(pid)
        .with_context(|| format!("failed to terminate process {pid}"))?;

    for child in &report.children_signalled {
        println!("terminated child {child}");
    }
    for child in &report.children_failed {
        eprintln!("could not terminate child {child}");
    }
    println!("terminated process {}", report.pid);
    Ok(())
}
