//! # conmon: connection monitor CLI
//!
//! Watches established TCP connections, keeps closed ones visible for a
//! grace period, and terminates the processes that own them.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

mod commands;
mod logging;
mod output;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.global, cli.is_interactive())?;
    commands::execute(cli)
}
