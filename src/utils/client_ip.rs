//! Client address resolution for click records.

use std::net::{IpAddr, Ipv4Addr};

/// Recorded when neither the forwarding header nor the transport yields an
/// address. Geo lookups never resolve it.
pub const UNKNOWN_CLIENT_IP: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Resolves the client IP for a click.
///
/// The first `X-Forwarded-For` entry wins when it parses as an address;
/// otherwise the peer address is used, then [`UNKNOWN_CLIENT_IP`].
pub fn resolve_client_ip(forwarded_for: Option<&str>, peer_ip: Option<IpAddr>) -> IpAddr {
    forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .and_then(|first| first.parse::<IpAddr>().ok())
        .or(peer_ip)
        .unwrap_or(UNKNOWN_CLIENT_IP)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_first_forwarded_entry_wins() {
        assert_eq!(
            resolve_client_ip(Some("203.0.113.5, 10.0.0.1"), Some(ip("127.0.0.1"))),
            ip("203.0.113.5")
        );
    }

    #[test]
    fn test_ipv6_forwarded_entry() {
        assert_eq!(
            resolve_client_ip(Some(" 2001:db8::1 "), None),
            ip("2001:db8::1")
        );
    }

    #[test]
    fn test_garbage_header_falls_back_to_peer() {
        assert_eq!(
            resolve_client_ip(Some("unknown"), Some(ip("198.51.100.4"))),
            ip("198.51.100.4")
        );
        assert_eq!(
            resolve_client_ip(Some(""), Some(ip("198.51.100.4"))),
            ip("198.51.100.4")
        );
    }

    #[test]
    fn test_sentinel_when_nothing_known() {
        assert_eq!(resolve_client_ip(None, None), UNKNOWN_CLIENT_IP);
        assert_eq!(resolve_client_ip(Some("junk"), None), ip("0.0.0.0"));
    }
}
