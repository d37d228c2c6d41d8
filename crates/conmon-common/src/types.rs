//! Domain primitive types used across the conmon workspace.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Operating-system process identifier.
///
/// Signed to match the kernel's `pid_t`; the value `0` is the sentinel the
/// socket table reports while a socket has not been attributed to a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(i32);

impl ProcessId {
    /// Creates a process id from its raw value.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw `pid_t` value.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self.0
    }

    /// Whether this id is the "not yet attributed" sentinel.
    #[must_use]
    pub const fn is_unresolved(self) -> bool {
        self.0 == crate::constants::UNRESOLVED_PID
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection state of a socket-table entry.
///
/// Only the two states the monitor acts on are distinguished; every other
/// TCP state collapses into [`SocketState::Ignored`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketState {
    /// Connected to a remote peer.
    Established,
    /// Bound and accepting inbound connections.
    Listening,
    /// Any other state (`TIME_WAIT`, `SYN_SENT`, `CLOSE`, ...).
    Ignored,
}

impl fmt::Display for SocketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Established => write!(f, "established"),
            Self::Listening => write!(f, "listening"),
            Self::Ignored => write!(f, "ignored"),
        }
    }
}

/// One row of the host socket table, copied out of the OS representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketEntry {
    /// Local address.
    pub local_addr: IpAddr,
    /// Local port.
    pub local_port: u16,
    /// Remote address (unspecified for listening sockets).
    pub remote_addr: IpAddr,
    /// Remote port (`0` for listening sockets).
    pub remote_port: u16,
    /// Connection state.
    pub state: SocketState,
    /// Owning process, or the unresolved sentinel.
    pub pid: ProcessId,
}

impl SocketEntry {
    /// Builds an established entry.
    #[must_use]
    pub const fn established(
        local_addr: IpAddr,
        local_port: u16,
        remote_addr: IpAddr,
        remote_port: u16,
        pid: ProcessId,
    ) -> Self {
        Self {
            local_addr,
            local_port,
            remote_addr,
            remote_port,
            state: SocketState::Established,
            pid,
        }
    }

    /// Builds a listening entry with an unspecified remote endpoint.
    #[must_use]
    pub const fn listening(local_addr: IpAddr, local_port: u16, pid: ProcessId) -> Self {
        Self {
            local_addr,
            local_port,
            remote_addr: IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
            remote_port: 0,
            state: SocketState::Listening,
            pid,
        }
    }
}

/// A socket bound and waiting for connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListeningSocket {
    /// Bound address.
    pub addr: IpAddr,
    /// Bound port.
    pub port: u16,
}

impl fmt::Display for ListeningSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr {
            IpAddr::V4(v4) => write!(f, "{v4}:{}", self.port),
            IpAddr::V6(v6) => write!(f, "[{v6}]:{}", self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use super::*;

    #[test]
    fn zero_pid_is_unresolved() {
        assert!(ProcessId::new(0).is_unresolved());
        assert!(!ProcessId::new(1).is_unresolved());
    }

    #[test]
    fn listening_entry_has_no_remote_peer() {
        let entry = SocketEntry::listening(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080, ProcessId::new(7));
        assert_eq!(entry.state, SocketState::Listening);
        assert_eq!(entry.remote_port, 0);
        assert!(entry.remote_addr.is_unspecified());
    }

    #[test]
    fn listening_socket_brackets_ipv6() {
        let v6 = ListeningSocket {
            addr: IpAddr::V6(Ipv6Addr::LOCALHOST),
            port: 443,
        };
        let v4 = ListeningSocket {
            addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 22,
        };
        assert_eq!(v6.to_string(), "[::1]:443");
        assert_eq!(v4.to_string(), "0.0.0.0:22");
    }

    #[test]
    fn socket_state_serializes_snake_case() {
        let json = serde_json::to_string(&SocketState::Established).expect("serialize");
        assert_eq!(json, "\"established\"");
    }
}
