//! Startup privilege check.
//!
//! Attributing sockets of other users' processes needs read access to
//! their `/proc/<pid>/fd`, which in practice means running as root.

use conmon_common::constants::{PRIVILEGE_OVERRIDE_ENV, SUDO_USER_ENV};

/// How the current process satisfied the privilege check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Effective uid is 0.
    Root,
    /// Launched through `sudo`.
    Sudo,
    /// The override variable is set.
    Override,
    /// None of the above.
    Unprivileged,
}

impl Privilege {
    /// Whether the monitor may start.
    #[must_use]
    pub const fn is_sufficient(self) -> bool {
        !matches!(self, Self::Unprivileged)
    }
}

/// Inspects the effective uid and environment of the current process.
#[must_use]
pub fn detect() -> Privilege {
    classify(
        effective_uid_is_root(),
        env_is_set(SUDO_USER_ENV),
        env_is_set(PRIVILEGE_OVERRIDE_ENV),
    )
}

/// Combines the individual checks; root wins over sudo, sudo over override.
#[must_use]
pub const fn classify(root: bool, sudo: bool, override_set: bool) -> Privilege {
    if root {
        Privilege::Root
    } else if sudo {
        Privilege::Sudo
    } else if override_set {
        Privilege::Override
    } else {
        Privilege::Unprivileged
    }
}

fn env_is_set(name: &str) -> bool {
    std::env::var_os(name).is_some_and(|v| !v.is_empty())
}

#[cfg(unix)]
fn effective_uid_is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
const fn effective_uid_is_root() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_takes_precedence() {
        assert_eq!(classify(true, true, true), Privilege::Root);
    }

    #[test]
    fn sudo_without_root_is_sufficient() {
        let privilege = classify(false, true, false);
        assert_eq!(privilege, Privilege::Sudo);
        assert!(privilege.is_sufficient());
    }

    #[test]
    fn override_is_sufficient() {
        assert!(classify(false, false, true).is_sufficient());
    }

    #[test]
    fn nothing_set_is_unprivileged() {
        assert!(!classify(false, false, false).is_sufficient());
    }
}
