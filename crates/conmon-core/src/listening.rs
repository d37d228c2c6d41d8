//! Listening-socket collection.
//!
//! Stateless: the result is rebuilt from scratch on every cycle and carries
//! no identity or grace handling.

use conmon_common::types::{ListeningSocket, SocketEntry, SocketState};

/// Returns every listening entry of the snapshot, in snapshot order.
#[must_use]
pub fn collect(snapshot: &[SocketEntry]) -> Vec<ListeningSocket> {
    snapshot
        .iter()
        .filter(|e| e.state == SocketState::Listening)
        .map(|e| ListeningSocket {
            addr: e.local_addr,
            port: e.local_port,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use conmon_common::types::ProcessId;

    use super::*;

    const ANY: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

    #[test]
    fn keeps_only_listening_entries() {
        let snapshot = vec![
            SocketEntry::listening(ANY, 22, ProcessId::new(1)),
            SocketEntry::established(ANY, 22, ANY, 40_000, ProcessId::new(2)),
            SocketEntry::listening(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 80, ProcessId::new(0)),
        ];
        let listening = collect(&snapshot);
        assert_eq!(
            listening,
            vec![
                ListeningSocket { addr: ANY, port: 22 },
                ListeningSocket {
                    addr: IpAddr::V6(Ipv6Addr::UNSPECIFIED),
                    port: 80
                },
            ]
        );
    }

    #[test]
    fn no_carryover_between_cycles() {
        let first = collect(&[SocketEntry::listening(ANY, 8080, ProcessId::new(3))]);
        let second = collect(&[]);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }
}
