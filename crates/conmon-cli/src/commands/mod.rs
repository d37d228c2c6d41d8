//! CLI command definitions and dispatch.

pub mod kill;
pub mod listening;
pub mod snapshot;
pub mod watch;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use conmon_common::config::MonitorConfig;

/// conmon: watch TCP connections and terminate the processes behind them.
#[derive(Parser, Debug)]
#[command(name = "conmon", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute; defaults to `watch`.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Flags accepted before or after any subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// JSON configuration file.
    #[arg(long, global = true, env = "CONMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cycles a closed connection stays visible before removal.
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub grace_ticks: Option<i64>,

    /// Milliseconds between socket-table snapshots.
    #[arg(long, global = true)]
    pub interval_ms: Option<u64>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Append logs to this file instead of stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Live dashboard of established connections (requires superuser).
    Watch(watch::WatchArgs),
    /// Run the monitor headless and print the connection view.
    Snapshot(snapshot::SnapshotArgs),
    /// List listening sockets once.
    Listening(listening::ListeningArgs),
    /// Terminate a process and its direct children.
    Kill(kill::KillArgs),
}

impl Cli {
    /// Whether this invocation takes over the terminal.
    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Command::Watch(_)))
    }
}

impl GlobalArgs {
    /// Builds the monitor configuration: file first, then flag overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or a value is out of
    /// range.
    pub fn monitor_config(&self) -> anyhow::Result<MonitorConfig> {
        let mut config = match &self.config {
            Some(path) => MonitorConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => MonitorConfig::default(),
        };
        if let Some(ticks) = self.grace_ticks {
            config = config.with_grace_ticks(ticks)?;
        }
        if let Some(interval_ms) = self.interval_ms {
            config = config.with_poll_interval_ms(interval_ms);
        }
        config.validate()?;
        tracing::debug!(
            grace_ticks = config.grace_ticks,
            poll_interval_ms = config.poll_interval_ms,
            "configuration resolved"
        );
        Ok(config)
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// Only the commands that run the monitor resolve the configuration.
///
/// # Errors
///
/// Returns an error if the monitor configuration is invalid or the command
/// fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        None => watch::execute(&watch::WatchArgs::default(), &cli.global.monitor_config()?),
        Some(Command::Watch(args)) => watch::execute(&args, &cli.global.monitor_config()?),
        Some(Command::Snapshot(args)) => snapshot::execute(&args, &cli.global.monitor_config()?),
        Some(Command::Listening(args)) => listening::execute(&args),
        Some(Command::Kill(args)) => kill::execute(&args),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::CommandFactory;
    use conmon_common::constants::DEFAULT_GRACE_TICKS;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_watch() {
        let cli = Cli::try_parse_from(["conmon"]).expect("parse");
        assert!(cli.command.is_none());
        assert!(cli.is_interactive());
    }

    #[test]
    fn snapshot_is_headless() {
        let cli = Cli::try_parse_from(["conmon", "snapshot", "--cycles", "3", "--json"]).expect("parse");
        assert!(!cli.is_interactive());
        let Some(Command::Snapshot(args)) = cli.command else {
            panic!("expected snapshot");
        };
        assert_eq!(args.cycles, 3);
        assert!(args.json);
    }

    #[test]
    fn defaults_apply_without_flags() {
        let cli = Cli::try_parse_from(["conmon", "listening"]).expect("parse");
        let config = cli.global.monitor_config().expect("config");
        assert_eq!(config.grace_ticks, DEFAULT_GRACE_TICKS);
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, r#"{{"grace_ticks": 7, "poll_interval_ms": 500}}"#).expect("write");
        let path = file.path().to_str().expect("utf-8 path");

        let cli = Cli::try_parse_from(["conmon", "snapshot", "--config", path, "--grace-ticks", "4"]).expect("parse");
        let config = cli.global.monitor_config().expect("config");
        assert_eq!(config.grace_ticks, 4);
        assert_eq!(config.poll_interval_ms, 500);
    }

    #[test]
    fn negative_grace_is_rejected() {
        let cli = Cli::try_parse_from(["conmon", "snapshot", "--grace-ticks", "-1"]).expect("parse");
        assert!(cli.global.monitor_config().is_err());
    }

    #[test]
    fn kill_ignores_monitor_configuration() {
        let cli = Cli::try_parse_from([
            "conmon",
            "kill",
            "2147483647",
            "--grace-ticks",
            "-1",
            "--config",
            "/nonexistent/conmon.json",
        ])
        .expect("parse");

        let err = execute(cli).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("failed to terminate process 2147483647"), "got: {chain}");
        assert!(!chain.contains("config"), "got: {chain}");
    }
}
