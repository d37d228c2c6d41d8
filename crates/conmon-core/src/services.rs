//! Service annotations derived from well-known local ports.

/// Fallback annotation for ports without a known service.
pub const UNKNOWN_SERVICE: &str = "unknown service";

const WELL_KNOWN: &[(u16, &str)] = &[
    (20, "ftp-data"),
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (53, "dns"),
    (80, "http"),
    (110, "pop3"),
    (143, "imap"),
    (443, "https"),
    (465, "smtps"),
    (587, "submission"),
    (993, "imaps"),
    (995, "pop3s"),
    (3306, "mysql"),
    (3389, "rdp"),
    (5432, "postgresql"),
    (5900, "vnc"),
    (6379, "redis"),
    (8080, "http-alt"),
    (8443, "https-alt"),
    (27017, "mongodb"),
];

/// Returns a human-readable hint about the service bound to `port`.
#[must_use]
pub fn annotate(port: u16) -> &'static str {
    WELL_KNOWN
        .binary_search_by_key(&port, |&(p, _)| p)
        .map_or(UNKNOWN_SERVICE, |i| WELL_KNOWN[i].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_for_binary_search() {
        assert!(WELL_KNOWN.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn ssh_port_is_annotated() {
        assert_eq!(annotate(22), "ssh");
        assert_eq!(annotate(443), "https");
    }

    #[test]
    fn ephemeral_port_is_unknown() {
        assert_eq!(annotate(49_152), UNKNOWN_SERVICE);
    }
}
