//! Monitor configuration model.
//!
//! Values come from the built-in defaults, an optional JSON file, and CLI
//! overrides, in that order. [`MonitorConfig::validate`] runs once before the
//! polling task starts.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GRACE_TICKS, DEFAULT_POLL_INTERVAL_MS};
use crate::error::{ConmonError, Result};

/// Root configuration for the connection monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Cycles a vanished connection stays rendered as dying.
    pub grace_ticks: u32,
    /// Interval between socket-table snapshots, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            grace_ticks: DEFAULT_GRACE_TICKS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl MonitorConfig {
    /// Loads a configuration file, filling missing keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds values rejected by [`MonitorConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConmonError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| ConmonError::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides the grace period from a signed operator-supplied value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative, zero, or does not fit
    /// in a tick counter.
    pub fn with_grace_ticks(mut self, ticks: i64) -> Result<Self> {
        if ticks < 1 {
            return Err(ConmonError::Config {
                message: format!("grace ticks must be at least 1, got {ticks}"),
            });
        }
        self.grace_ticks = u32::try_from(ticks).map_err(|_| ConmonError::Config {
            message: format!("grace ticks out of range: {ticks}"),
        })?;
        Ok(self)
    }

    /// Overrides the poll interval.
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Checks every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns a [`ConmonError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.grace_ticks == 0 {
            return Err(ConmonError::Config {
                message: "grace_ticks must be at least 1".into(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConmonError::Config {
                message: "poll_interval_ms must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Poll interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MonitorConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.grace_ticks, DEFAULT_GRACE_TICKS);
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn negative_grace_is_rejected() {
        let err = MonitorConfig::default().with_grace_ticks(-3).unwrap_err();
        assert!(matches!(err, ConmonError::Config { .. }));
        assert!(err.to_string().contains("-3"), "got: {err}");
    }

    #[test]
    fn zero_grace_is_rejected() {
        assert!(MonitorConfig::default().with_grace_ticks(0).is_err());
    }

    #[test]
    fn oversized_grace_is_rejected() {
        assert!(MonitorConfig::default().with_grace_ticks(i64::MAX).is_err());
    }

    #[test]
    fn zero_interval_fails_validation() {
        let config = MonitorConfig::default().with_poll_interval_ms(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_fills_missing_keys_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("conmon.json");
        std::fs::write(&path, r#"{ "grace_ticks": 5 }"#).expect("write");

        let config = MonitorConfig::load(&path).expect("load");
        assert_eq!(config.grace_ticks, 5);
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("conmon.json");
        std::fs::write(&path, r#"{ "grace": 5 }"#).expect("write");

        let err = MonitorConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConmonError::Config { .. }));
    }

    #[test]
    fn load_rejects_zero_grace_in_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("conmon.json");
        std::fs::write(&path, r#"{ "grace_ticks": 0 }"#).expect("write");

        assert!(MonitorConfig::load(&path).is_err());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = MonitorConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConmonError::Io { .. }));
    }
}
