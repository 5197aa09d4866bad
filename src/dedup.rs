//! Deduplication of classified entries.
//!
//! Domains are deduplicated by exact string. Networks are reduced to a
//! minimal covering set: no surviving range is contained in another.

use ahash::AHashSet;
use ipnet::IpNet;
use std::collections::BTreeSet;
use std::fmt;

use crate::entry::{classify, Entry};

/// Counters collected while deduplicating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Raw entries seen
    pub raw_entries: usize,
    /// Distinct networks before minimization
    pub networks_in: usize,
    /// Networks left after minimization
    pub networks_out: usize,
    /// Distinct domains
    pub domains: usize,
}

impl MergeStats {
    /// Number of networks dropped because a broader range covers them.
    pub fn subsumed(&self) -> usize {
        self.networks_in - self.networks_out
    }

    /// Number of entries in the merged output.
    pub fn total(&self) -> usize {
        self.networks_out + self.domains
    }
}

impl fmt::Display for MergeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} raw entries -> {} networks ({} subsumed) + {} domains",
            self.raw_entries,
            self.networks_out,
            self.subsumed(),
            self.domains
        )
    }
}

/// Result of a merge: a minimal network set plus the distinct domains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedList {
    /// Minimal ranges, sorted by (prefix length, network)
    networks: Vec<IpNet>,
    domains: BTreeSet<String>,
    stats: MergeStats,
}

impl MergedList {
    /// Surviving network ranges.
    pub fn networks(&self) -> &[IpNet] {
        &self.networks
    }

    /// Distinct domain entries.
    pub fn domains(&self) -> &BTreeSet<String> {
        &self.domains
    }

    /// Counters from the deduplication pass.
    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    /// Number of entries in the merged list.
    pub fn len(&self) -> usize {
        self.networks.len() + self.domains.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty() && self.domains.is_empty()
    }

    /// All entries in their canonical string form, in byte-lexicographic order.
    ///
    /// Canonical network strings always parse back as networks, so they can
    /// never collide with a domain.
    pub fn entries(&self) -> BTreeSet<String> {
        self.networks
            .iter()
            .map(|net| net.to_string())
            .chain(self.domains.iter().cloned())
            .collect()
    }
}

/// Classify raw entries and deduplicate them.
///
/// # Examples
/// ```
/// use k2list::dedup::deduplicate;
///
/// let merged = deduplicate(["10.0.0.0/24", "10.0.0.0/16", "example.com"]);
/// let entries: Vec<String> = merged.entries().into_iter().collect();
/// assert_eq!(entries, ["10.0.0.0/16", "example.com"]);
/// ```
pub fn deduplicate<I, S>(raw: I) -> MergedList
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut raw_entries = 0;
    let mut networks = AHashSet::new();
    let mut domains = BTreeSet::new();

    for entry in raw {
        raw_entries += 1;
        match classify(entry.as_ref()) {
            Entry::Network(net) => {
                networks.insert(net);
            }
            Entry::Domain(domain) => {
                domains.insert(domain);
            }
        }
    }

    let networks_in = networks.len();
    let networks = minimize(networks);

    let stats = MergeStats {
        raw_entries,
        networks_in,
        networks_out: networks.len(),
        domains: domains.len(),
    };
    log::debug!("deduplicated: {}", stats);

    MergedList {
        networks,
        domains,
        stats,
    }
}

/// Reduce networks to a minimal covering set.
///
/// Ranges are visited by ascending prefix length, so every possible container
/// of a range is decided before the range itself. A range is kept unless an
/// already kept range contains it; equal ranges are kept once.
///
/// The result is sorted by (prefix length, network). Among ranges with equal
/// prefix length, IPv4 sorts before IPv6, then by address.
pub fn minimize<I>(nets: I) -> Vec<IpNet>
where
    I: IntoIterator<Item = IpNet>,
{
    let mut sorted: Vec<IpNet> = nets.into_iter().map(|net| net.trunc()).collect();
    sorted.sort_unstable_by_key(|net| (net.prefix_len(), *net));

    let mut kept: AHashSet<IpNet> = AHashSet::with_capacity(sorted.len());
    let mut result = Vec::new();

    for net in sorted {
        if is_covered(&net, &kept) {
            log::trace!("dropping {}: covered by a broader range", net);
            continue;
        }
        kept.insert(net);
        result.push(net);
    }

    result
}

/// Check whether `net` or any of its supernets is already kept.
///
/// Walking at most 33 (IPv4) or 129 (IPv6) supernets is equivalent to
/// testing containment against every kept range.
fn is_covered(net: &IpNet, kept: &AHashSet<IpNet>) -> bool {
    let mut current = Some(*net);
    while let Some(candidate) = current {
        if kept.contains(&candidate) {
            return true;
        }
        current = candidate.supernet();
    }
    false
}

/// Check if `container` fully contains `contained`.
///
/// Ranges of different address families never contain each other.
pub fn is_subnet_of(contained: &IpNet, container: &IpNet) -> bool {
    match (container, contained) {
        (IpNet::V4(c), IpNet::V4(t)) => c.contains(t),
        (IpNet::V6(c), IpNet::V6(t)) => c.contains(t),
        _ => false,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// Raw entry strings: IPv4 CIDRs with host bits, bare IPv4 addresses,
    /// IPv6 CIDRs and domain-like strings.
    fn raw_entry_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u8..=255, 0u8..=255, 0u8..=255, 0u8..=255, 0u8..=32)
                .prop_map(|(a, b, c, d, p)| format!("{}.{}.{}.{}/{}", a, b, c, d, p)),
            (0u8..=3, 0u8..=255, 0u8..=255)
                .prop_map(|(a, b, c)| format!("10.{}.{}.{}", a, b, c)),
            (0u16..=4, any::<u16>(), 0u8..=128)
                .prop_map(|(a, b, p)| format!("2001:db8:{:x}:{:x}::/{}", a, b, p)),
            "[a-z]{1,8}\\.(com|net|org)",
        ]
    }

    fn raw_vec_strategy(max_size: usize) -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(raw_entry_strategy(), 0..max_size)
    }

    proptest! {
        /// No surviving range contains another
        #[test]
        fn prop_minimal_set(raw in raw_vec_strategy(100)) {
            let merged = deduplicate(&raw);
            let networks = merged.networks();
            for (i, a) in networks.iter().enumerate() {
                for (j, b) in networks.iter().enumerate() {
                    if i != j {
                        prop_assert!(!is_subnet_of(b, a), "{} contains {}", a, b);
                    }
                }
            }
        }

        /// Every input is kept as a domain or covered by a surviving range
        #[test]
        fn prop_union_complete(raw in raw_vec_strategy(100)) {
            let merged = deduplicate(&raw);
            for entry in &raw {
                match classify(entry) {
                    Entry::Network(net) => prop_assert!(
                        merged.networks().iter().any(|kept| is_subnet_of(&net, kept)),
                        "{} not covered", entry
                    ),
                    Entry::Domain(domain) => prop_assert!(merged.domains().contains(&domain)),
                }
            }
        }

        /// Feeding the output back in yields the same entries
        #[test]
        fn prop_idempotent(raw in raw_vec_strategy(100)) {
            let first = deduplicate(&raw).entries();
            let second = deduplicate(&first).entries();
            prop_assert_eq!(first, second);
        }

        /// Input order does not affect the output
        #[test]
        fn prop_order_independent(raw in raw_vec_strategy(60)) {
            let mut reversed = raw.clone();
            reversed.reverse();
            prop_assert_eq!(deduplicate(&raw).entries(), deduplicate(&reversed).entries());
        }

        /// Minimization never adds ranges and never repeats one
        #[test]
        fn prop_minimize_no_duplicates(raw in raw_vec_strategy(100)) {
            let input: Vec<IpNet> = raw
                .iter()
                .filter_map(|s| crate::entry::parse_network(s))
                .collect();
            let minimal = minimize(input.clone());
            prop_assert!(minimal.len() <= input.len());
            let set: HashSet<_> = minimal.iter().collect();
            prop_assert_eq!(set.len(), minimal.len());
        }
    }
}
