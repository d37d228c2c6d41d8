//! `conmon watch`: the live dashboard.

use std::time::Duration;

use anyhow::Context;
use clap::Args;
use conmon_common::config::MonitorConfig;
use conmon_common::constants::PRIVILEGE_OVERRIDE_ENV;
use conmon_core::monitor::Monitor;
use conmon_core::terminate::Terminator;
use conmon_sys::privilege;
use conmon_sys::process::ProcProcessTree;
use conmon_sys::procnet::ProcNetSource;

const DEFAULT_FRAME_MS: u64 = 100;

/// Arguments for the `watch` command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Milliseconds to wait for a key press before redrawing.
    #[arg(long, default_value_t = DEFAULT_FRAME_MS)]
    pub frame_ms: u64,
}

impl Default for WatchArgs {
    fn default() -> Self {
        Self {
            frame_ms: DEFAULT_FRAME_MS,
        }
    }
}

/// Executes the `watch` command.
///
/// Spawns the monitor on a tokio runtime and hands its view channel to
/// the dashboard. The monitor stops once the dashboard drops the channel.
///
/// # Errors
///
/// Returns an error if the process lacks privileges or the terminal
/// cannot be driven.
pub fn execute(args: &WatchArgs, config: &MonitorConfig) -> anyhow::Result<()> {
    let privilege = privilege::detect();
    if !privilege.is_sufficient() {
        anyhow::bail!(
            "conmon needs superuser privileges to see which process owns each socket; \
             run it with sudo, or set {PRIVILEGE_OVERRIDE_ENV}=1 to start anyway"
        );
    }
    tracing::info!(?privilege, "privilege check passed");

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let _guard = runtime.enter();

    let (monitor, views) = Monitor::new(ProcNetSource::new(), config);
    let handle = monitor.spawn();
    let terminator = Terminator::new(ProcProcessTree::new());

    let mut terminal = ratatui::try_init().context("failed to initialise terminal")?;
    let result = conmon_tui::run(
        &mut terminal,
        views,
        &terminator,
        Duration::from_millis(args.frame_ms),
    );
    ratatui::restore();

    if let Err(e) = runtime.block_on(handle) {
        tracing::warn!(error = %e, "monitor task ended abnormally");
    }
    result.context("dashboard failed")
}
