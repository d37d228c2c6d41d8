//! `conmon snapshot`: headless monitor runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use clap::Args;
use conmon_common::config::MonitorConfig;
use conmon_core::monitor::{Monitor, MonitorView};
use conmon_sys::procnet::ProcNetSource;

use crate::output;

/// Arguments for the `snapshot` command.
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Number of cycles to run before printing the view.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub cycles: u32,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Print every cycle until interrupted.
    #[arg(short, long)]
    pub follow: bool,
}

/// Executes the `snapshot` command.
///
/// Cycles are spaced by the configured poll interval so closed
/// connections count down exactly as they do in the dashboard.
///
/// # Errors
///
/// Returns an error if a snapshot fails outside follow mode or output
/// cannot be serialized.
pub fn execute(args: &SnapshotArgs, config: &MonitorConfig) -> anyhow::Result<()> {
    let (mut monitor, _views) = Monitor::new(ProcNetSource::new(), config);

    if args.follow {
        return follow(&mut monitor, args.json, config);
    }

    let mut view = monitor.tick().context("failed to read socket tables")?;
    for _ in 1..args.cycles {
        std::thread::sleep(config.poll_interval());
        view = monitor.tick().context("failed to read socket tables")?;
    }
    print_view(&view, args.json)
}

fn follow(monitor: &mut Monitor<ProcNetSource>, json: bool, config: &MonitorConfig) -> anyhow::Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("failed to set Ctrl+C handler")?;

    while running.load(Ordering::SeqCst) {
        match monitor.tick() {
            Ok(view) => print_view(&view, json)?,
            Err(e) => tracing::warn!(error = %e, "skipping cycle"),
        }
        std::thread::sleep(config.poll_interval());
    }
    Ok(())
}

fn print_view(view: &MonitorView, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(view)?);
    } else {
        println!("cycle {}", view.cycle);
        print!("{}", output::connection_table(&view.connections));
    }
    Ok(())
}
