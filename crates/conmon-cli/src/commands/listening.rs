//! `conmon listening`: list listening sockets once.

use anyhow::Context;
use clap::Args;
use conmon_core::listening;
use conmon_core::source::SnapshotSource;
use conmon_sys::procnet::ProcNetSource;

use crate::output;

/// Arguments for the `listening` command.
#[derive(Args, Debug)]
pub struct ListeningArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `listening` command.
///
/// # Errors
///
/// Returns an error if the socket tables cannot be read.
pub fn execute(args: &ListeningArgs) -> anyhow::Result<()> {
    let snapshot = ProcNetSource::new()
        .snapshot()
        .context("failed to read socket tables")?;
    let mut sockets = listening::collect(&snapshot);
    sockets.sort_by_key(|s| (s.port, s.addr));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sockets)?);
    } else {
        print!("{}", output::listening_table(&sockets));
    }
    Ok(())
}
