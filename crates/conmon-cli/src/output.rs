//! Formatted output helpers for CLI commands.
//!
//! Plain fixed-width tables; closing connections carry their remaining
//! grace cycles in the state column.

use std::fmt::Write;
use std::net::{IpAddr, SocketAddr};

use conmon_common::types::ListeningSocket;
use conmon_core::reconcile::RenderView;
use conmon_core::services;

/// Formats an address and port, bracketing IPv6 addresses.
#[must_use]
pub fn endpoint(addr: IpAddr, port: u16) -> String {
    SocketAddr::new(addr, port).to_string()
}

/// Renders the connection view as a table, one row per line.
#[must_use]
pub fn connection_table(view: &RenderView) -> String {
    if view.is_empty() {
        return "No established connections.\n".to_owned();
    }
    let mut out = format!(
        "{:<6} {:<28} {:<28} {:<8} {:<16} {}\n",
        "ID", "LOCAL", "REMOTE", "PID", "SERVICE", "STATE"
    );
    for row in view.rows() {
        let state = if row.dying {
            format!("closing ({} left)", row.grace_remaining)
        } else {
            "open".to_owned()
        };
        let _ = writeln!(
            out,
            "{:<6} {:<28} {:<28} {:<8} {:<16} {state}",
            row.id.to_string(),
            endpoint(row.local_addr, row.local_port),
            endpoint(row.remote_addr, row.remote_port),
            row.pid.to_string(),
            row.annotation,
        );
    }
    out
}

/// Renders listening sockets in the order given.
#[must_use]
pub fn listening_table(sockets: &[ListeningSocket]) -> String {
    if sockets.is_empty() {
        return "No listening sockets.\n".to_owned();
    }
    let mut out = format!("{:<46} {}\n", "SOCKET", "SERVICE");
    for socket in sockets {
        let _ = writeln!(
            out,
            "{:<46} {}",
            endpoint(socket.addr, socket.port),
            services::annotate(socket.port)
        );
    }
    out
}
