//! Socket-table snapshots from the proc filesystem.
//!
//! `/proc/net/tcp` and `/proc/net/tcp6` list one socket per line:
//!
//! ```text
//!   sl  local_address rem_address   st tx_queue:rx_queue tr:tm->when retrnsmt uid timeout inode
//!    0: 0100007F:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000 1000 0 31337 ...
//! ```
//!
//! Addresses are the kernel's native-endian words printed in hex, ports are
//! plain hex. Ownership is not part of the table: it is recovered by mapping
//! the socket inode to the process holding a `socket:[inode]` descriptor.
//! Sockets whose owner cannot be read keep the unresolved pid.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};

use conmon_common::error::{ConmonError, Result};
use conmon_common::types::{ProcessId, SocketEntry, SocketState};
use conmon_core::source::SnapshotSource;

const TCP_ESTABLISHED: u8 = 0x01;
const TCP_LISTEN: u8 = 0x0A;

/// A socket-table line before process attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSocket {
    /// Local address.
    pub local_addr: IpAddr,
    /// Local port.
    pub local_port: u16,
    /// Remote address.
    pub remote_addr: IpAddr,
    /// Remote port.
    pub remote_port: u16,
    /// Kernel TCP state code.
    pub state: u8,
    /// Socket inode, `0` for sockets without one (e.g. `TIME_WAIT`).
    pub inode: u64,
}

/// Maps a kernel TCP state code to the monitor's state.
#[must_use]
pub const fn socket_state(code: u8) -> SocketState {
    match code {
        TCP_ESTABLISHED => SocketState::Established,
        TCP_LISTEN => SocketState::Listening,
        _ => SocketState::Ignored,
    }
}

/// Parses one `/proc/net/tcp{,6}` data line. Returns `None` for the header
/// and malformed lines.
#[must_use]
pub fn parse_line(line: &str) -> Option<RawSocket> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 10 || !fields[0].ends_with(':') {
        return None;
    }
    let (local_addr, local_port) = parse_endpoint(fields[1])?;
    let (remote_addr, remote_port) = parse_endpoint(fields[2])?;
    let state = u8::from_str_radix(fields[3], 16).ok()?;
    let inode = fields[9].parse().ok()?;
    Some(RawSocket {
        local_addr,
        local_port,
        remote_addr,
        remote_port,
        state,
        inode,
    })
}

/// Parses an `ADDR:PORT` pair in either the IPv4 or IPv6 layout.
fn parse_endpoint(field: &str) -> Option<(IpAddr, u16)> {
    let (addr, port) = field.split_once(':')?;
    if !addr.is_ascii() {
        return None;
    }
    let port = u16::from_str_radix(port, 16).ok()?;
    let addr = match addr.len() {
        8 => IpAddr::V4(Ipv4Addr::from(parse_word(addr)?)),
        32 => {
            let mut octets = [0_u8; 16];
            for (chunk, word) in octets.chunks_exact_mut(4).zip(0..4) {
                chunk.copy_from_slice(&parse_word(&addr[word * 8..word * 8 + 8])?);
            }
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        _ => return None,
    };
    Some((addr, port))
}

/// Decodes one native-endian 32-bit word into network-order octets.
fn parse_word(hex: &str) -> Option<[u8; 4]> {
    u32::from_str_radix(hex, 16).ok().map(u32::to_ne_bytes)
}

/// Parses a whole table, skipping the header and malformed lines.
#[must_use]
pub fn parse_table(content: &str) -> Vec<RawSocket> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() && !line.trim().is_empty() {
                tracing::trace!(line, "skipping malformed socket-table line");
            }
            parsed
        })
        .collect()
}

/// Builds the socket inode → owning pid map by scanning `<root>/<pid>/fd`.
///
/// Processes whose descriptors cannot be read are skipped silently; their
/// sockets stay unresolved.
#[must_use]
pub fn socket_owners(root: &Path) -> HashMap<u64, ProcessId> {
    let mut owners = HashMap::new();
    let Ok(entries) = std::fs::read_dir(root) else {
        return owners;
    };
    for entry in entries.flatten() {
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<i32>().ok()) else {
            continue;
        };
        let Ok(fds) = std::fs::read_dir(entry.path().join("fd")) else {
            continue;
        };
        for fd in fds.flatten() {
            let Ok(target) = std::fs::read_link(fd.path()) else {
                continue;
            };
            if let Some(inode) = target.to_str().and_then(socket_inode) {
                let _ = owners.entry(inode).or_insert(ProcessId::new(pid));
            }
        }
    }
    owners
}

/// Extracts the inode from a `socket:[12345]` descriptor target.
fn socket_inode(target: &str) -> Option<u64> {
    target
        .strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

/// Reads host socket tables from a proc filesystem.
#[derive(Debug, Clone)]
pub struct ProcNetSource {
    root: PathBuf,
}

impl ProcNetSource {
    /// Reads from the host's `/proc`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(conmon_common::constants::PROC_ROOT)
    }

    /// Reads from an alternative proc root.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Proc root this source reads from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_tables(&self) -> Result<Vec<RawSocket>> {
        let tcp = self.root.join("net").join("tcp");
        let content = std::fs::read_to_string(&tcp).map_err(|e| ConmonError::SnapshotUnavailable {
            reason: format!("{}: {e}", tcp.display()),
        })?;
        let mut sockets = parse_table(&content);

        let tcp6 = self.root.join("net").join("tcp6");
        match std::fs::read_to_string(&tcp6) {
            Ok(content) => sockets.extend(parse_table(&content)),
            Err(e) => tracing::trace!(path = %tcp6.display(), error = %e, "no IPv6 table"),
        }
        Ok(sockets)
    }
}

impl Default for ProcNetSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSource for ProcNetSource {
    fn snapshot(&mut self) -> Result<Vec<SocketEntry>> {
        let sockets = self.read_tables()?;
        let owners = socket_owners(&self.root);
        let unresolved = ProcessId::new(conmon_common::constants::UNRESOLVED_PID);

        let entries: Vec<SocketEntry> = sockets
            .into_iter()
            .map(|raw| SocketEntry {
                local_addr: raw.local_addr,
                local_port: raw.local_port,
                remote_addr: raw.remote_addr,
                remote_port: raw.remote_port,
                state: socket_state(raw.state),
                pid: owners.get(&raw.inode).copied().unwrap_or(unresolved),
            })
            .collect();
        tracing::trace!(sockets = entries.len(), owners = owners.len(), "snapshot taken");
        Ok(entries)
    }
}
