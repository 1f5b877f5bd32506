//! IPv4 helpers for the one-/24-per-class addressing scheme.
//!
//! CIDR parsing, masking and containment come from `ipnet`; this file only
//! adds what the fleet layout needs on top of it.

pub use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

/// Prefix length of every class subnet.
pub const CLASS_PREFIX_LEN: u8 = 24;

/// The /16 network `a.b.0.0/16`.
pub const fn slash16(a: u8, b: u8) -> Ipv4Net {
    Ipv4Net::new_assert(Ipv4Addr::new(a, b, 0, 0), 16)
}

/// The /24 network `a.b.c.0/24`.
pub const fn slash24(a: u8, b: u8, c: u8) -> Ipv4Net {
    Ipv4Net::new_assert(Ipv4Addr::new(a, b, c, 0), CLASS_PREFIX_LEN)
}

/// The address with the given last octet inside a /24.
///
/// Returns `None` for anything other than a /24, where a single octet
/// cannot address the whole host range.
pub fn host_at(subnet: &Ipv4Net, octet: u8) -> Option<Ipv4Addr> {
    if subnet.prefix_len() != CLASS_PREFIX_LEN {
        return None;
    }
    let [a, b, c, _] = subnet.network().octets();
    Some(Ipv4Addr::new(a, b, c, octet))
}

/// Two CIDR blocks overlap exactly when one contains the other.
pub fn nets_overlap(a: &Ipv4Net, b: &Ipv4Net) -> bool {
    a.contains(b) || b.contains(a)
}

/// Check if every address of a network is private (RFC 1918)
pub fn is_private_net(net: &Ipv4Net) -> bool {
    net.network().is_private() && net.broadcast().is_private()
}
