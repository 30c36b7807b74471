use std::cmp::Ordering;
use std::collections::hash_set;
use std::collections::HashSet;
use std::fmt;
use std::iter::FromIterator;
use std::net::IpAddr;
use std::str::FromStr;

use itertools::Itertools;

use crate::rib::AddressFamily;
use crate::utils::{parse_host, parse_prefix, ParseError};

/// A single routed prefix: `prefix/mask -> next_hop`
///
/// Equality and hashing cover the whole triple, so two destinations for
/// the same prefix with different next hops are different values.
/// Ordering follows the canonical string form and only exists to keep
/// logs and tables stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Destination {
    pub prefix: IpAddr,
    pub mask: u8,
    pub next_hop: IpAddr,
}

impl Destination {
    pub fn new(prefix: IpAddr, mask: u8, next_hop: IpAddr) -> Self {
        Self {
            prefix,
            mask,
            next_hop,
        }
    }

    pub fn family(&self) -> AddressFamily {
        AddressFamily::of(&self.prefix)
    }

    /// The `prefix/mask` key used by the speaker to identify a route
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.prefix, self.mask)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{} -> {}", self.prefix, self.mask, self.next_hop)
    }
}

impl Ord for Destination {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl PartialOrd for Destination {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parse the canonical form, E.g. "10.0.0.0/24 -> 192.168.1.1"
impl FromStr for Destination {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (cidr, next_hop) = match s.split_once("->") {
            Some(parts) => parts,
            None => return Err(ParseError::Destination(s.to_string())),
        };
        let (prefix, mask) = parse_prefix(cidr)?;
        let next_hop = parse_host(next_hop)?;
        Ok(Destination::new(prefix, mask, next_hop))
    }
}

/// Unordered set of destinations, the unit of comparison between the
/// desired topology and the speaker's RIB
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DestinationSet(HashSet<Destination>);

impl DestinationSet {
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, destination: &Destination) -> bool {
        self.0.contains(destination)
    }

    /// Returns false if an equal destination was already present
    pub fn insert(&mut self, destination: Destination) -> bool {
        self.0.insert(destination)
    }

    pub fn iter(&self) -> hash_set::Iter<Destination> {
        self.0.iter()
    }

    /// Destinations in `self` that are not in `other`
    pub fn difference(&self, other: &DestinationSet) -> DestinationSet {
        self.0.difference(&other.0).copied().collect()
    }

    /// Drop destinations outside of the given families
    pub fn retain_families(&mut self, families: &[AddressFamily]) {
        self.0.retain(|d| families.contains(&d.family()));
    }

    /// Destinations in canonical order, for logs and display
    pub fn sorted(&self) -> Vec<Destination> {
        self.0.iter().copied().sorted().collect()
    }
}

impl fmt::Display for DestinationSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.sorted().iter().join("\n"))
    }
}

impl FromIterator<Destination> for DestinationSet {
    fn from_iter<I: IntoIterator<Item = Destination>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Destination> for DestinationSet {
    fn extend<I: IntoIterator<Item = Destination>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<'a> IntoIterator for &'a DestinationSet {
    type Item = &'a Destination;
    type IntoIter = hash_set::Iter<'a, Destination>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for DestinationSet {
    type Item = Destination;
    type IntoIter = hash_set::IntoIter<Destination>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dest(s: &str) -> Destination {
        s.parse().unwrap()
    }

    #[test]
    fn test_display_destination() {
        let d = dest("10.0.0.0/24 -> 192.168.1.1");
        assert_eq!(d.to_string(), "10.0.0.0/24 -> 192.168.1.1");
        assert_eq!(d.cidr(), "10.0.0.0/24");
        assert_eq!(d.family(), AddressFamily::Ipv4Unicast);
    }

    #[test]
    fn test_parse_destination() {
        assert_eq!(
            dest("10.0.0.9/24->10.0.0.1"),
            dest("10.0.0.0/24 -> 10.0.0.1"),
        );
        assert!("10.0.0.0/24".parse::<Destination>().is_err());
        assert!("10.0.0.0/24 -> nope".parse::<Destination>().is_err());
    }

    #[test]
    fn test_equality_covers_next_hop() {
        let a = dest("10.0.0.0/24 -> 192.168.1.1");
        let b = dest("10.0.0.0/24 -> 192.168.1.2");
        assert_ne!(a, b);
        assert_eq!(a, dest("10.0.0.0/24 -> 192.168.1.1"));

        let set: DestinationSet = vec![a].into_iter().collect();
        assert!(set.contains(&a));
        assert!(!set.contains(&b));
    }

    #[test]
    fn test_ordering_is_canonical_string() {
        let set: DestinationSet = vec![
            dest("10.0.1.0/24 -> 10.0.0.2"),
            dest("10.0.0.0/24 -> 10.0.0.9"),
            dest("10.0.0.0/24 -> 10.0.0.10"),
        ]
        .into_iter()
        .collect();
        let sorted: Vec<String> = set.sorted().iter().map(|d| d.to_string()).collect();
        assert_eq!(
            sorted,
            vec![
                "10.0.0.0/24 -> 10.0.0.10",
                "10.0.0.0/24 -> 10.0.0.9",
                "10.0.1.0/24 -> 10.0.0.2",
            ]
        );
        assert_eq!(
            set.to_string(),
            "10.0.0.0/24 -> 10.0.0.10\n10.0.0.0/24 -> 10.0.0.9\n10.0.1.0/24 -> 10.0.0.2"
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut set = DestinationSet::new();
        assert!(set.insert(dest("10.0.0.0/24 -> 10.0.0.1")));
        assert!(!set.insert(dest("10.0.0.0/24 -> 10.0.0.1")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_retain_families() {
        let mut set: DestinationSet = vec![
            dest("10.0.0.0/24 -> 10.0.0.1"),
            dest("3001:404:a::/64 -> 3001:1::1"),
        ]
        .into_iter()
        .collect();
        set.retain_families(&[AddressFamily::Ipv4Unicast]);
        assert_eq!(set.sorted(), vec![dest("10.0.0.0/24 -> 10.0.0.1")]);
    }
}
