//! Classification of raw list entries.
//!
//! A raw entry is either a network (an IP address or CIDR range, IPv4 or
//! IPv6) or an opaque domain string. Classification never fails: anything
//! that does not parse as a network is kept as a domain, byte for byte.

use ipnet::IpNet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

/// A classified list entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entry {
    /// IP address or CIDR range, host bits masked off
    Network(IpNet),
    /// Anything else, preserved exactly as given
    Domain(String),
}

impl Entry {
    /// Returns `true` if this entry is a network range.
    pub fn is_network(&self) -> bool {
        matches!(self, Entry::Network(_))
    }

    /// Returns `true` if this entry is an opaque domain string.
    pub fn is_domain(&self) -> bool {
        matches!(self, Entry::Domain(_))
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Network(net) => write!(f, "{}", net),
            Entry::Domain(domain) => f.write_str(domain),
        }
    }
}

/// Classify a raw entry.
///
/// # Examples
/// ```
/// use k2list::entry::{classify, Entry};
///
/// assert!(classify("10.0.0.5/24").is_network());
/// assert_eq!(classify("example.com"), Entry::Domain("example.com".to_string()));
/// ```
pub fn classify(raw: &str) -> Entry {
    match parse_network(raw) {
        Some(net) => Entry::Network(net),
        None => Entry::Domain(raw.to_string()),
    }
}

/// Parse an IP address or network, returning the canonical network.
///
/// Accepted forms:
/// - bare address: `192.168.1.1`, `2001:db8::1` (a /32 or /128 network)
/// - address with decimal prefix: `10.0.0.5/24`, `2001:db8::1/32`
/// - IPv4 address with netmask or hostmask: `10.0.0.5/255.255.255.0`,
///   `10.0.0.5/0.0.0.255`
///
/// Host bits are masked off rather than rejected, so `10.0.0.5/24` yields
/// `10.0.0.0/24`.
pub fn parse_network(raw: &str) -> Option<IpNet> {
    if let Ok(addr) = raw.parse::<IpAddr>() {
        return IpNet::new(addr, max_prefix_len(addr)).ok();
    }

    let (addr, prefix) = raw.split_once('/')?;
    let addr: IpAddr = addr.parse().ok()?;
    let prefix_len = parse_prefix_len(addr, prefix)?;

    IpNet::new(addr, prefix_len).ok().map(|net| net.trunc())
}

fn max_prefix_len(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

/// Parse the part after the slash. Range checks are left to `IpNet::new`.
fn parse_prefix_len(addr: IpAddr, prefix: &str) -> Option<u8> {
    // Only plain ASCII digits; `u8::from_str` alone would accept "+24".
    if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) {
        return prefix.parse().ok();
    }

    match addr {
        IpAddr::V4(_) => {
            let mask: Ipv4Addr = prefix.parse().ok()?;
            ipnet::ipv4_mask_to_prefix(mask).ok().or_else(|| {
                let hostmask = Ipv4Addr::from(!u32::from(mask));
                ipnet::ipv4_mask_to_prefix(hostmask).ok()
            })
        }
        IpAddr::V6(_) => None,
    }
}
