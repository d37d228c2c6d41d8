//! System-wide constants and defaults.

/// Number of cycles a vanished connection stays visible before removal.
pub const DEFAULT_GRACE_TICKS: u32 = 30;

/// Default interval between two socket-table snapshots, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Owning process id reported while the kernel has not attributed a socket yet.
pub const UNRESOLVED_PID: i32 = 0;

/// Mount point of the proc filesystem.
pub const PROC_ROOT: &str = "/proc";

/// Environment variable that bypasses the superuser check.
pub const PRIVILEGE_OVERRIDE_ENV: &str = "CONMON_OVR";

/// Environment variable set by `sudo` for the invoking user.
pub const SUDO_USER_ENV: &str = "SUDO_USER";
