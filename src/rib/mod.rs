mod diff;
pub mod families;

pub use diff::{diff, Diff};
pub use families::AddressFamily;

use log::error;

use crate::api::RoutingTable;
use crate::models::{Destination, DestinationSet};
use crate::utils::parse_prefix;

/// Convert the speaker's table into destinations
///
/// Entries with an unparseable prefix, or with anything other than
/// exactly one known path, are logged and left out.
pub fn normalize(table: &RoutingTable) -> DestinationSet {
    let mut result = DestinationSet::new();
    for (key, entry) in table.destinations.iter() {
        let (prefix, mask) = match parse_prefix(key) {
            Ok(parsed) => parsed,
            Err(err) => {
                error!("Failed to parse RIB prefix {}, skipped: {}", key, err);
                continue;
            }
        };
        match entry.paths.as_slice() {
            [path] => {
                result.insert(Destination::new(prefix, mask, path.next_hop));
            }
            paths => {
                let next_hops: Vec<String> =
                    paths.iter().map(|p| p.next_hop.to_string()).collect();
                error!(
                    "Expecting one path per destination, got {} for {} [{}]",
                    paths.len(),
                    key,
                    next_hops.join(", "),
                );
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{KnownPath, RibDestination};

    fn dest(s: &str) -> Destination {
        s.parse().unwrap()
    }

    #[test]
    fn test_normalize_single_paths() {
        let mut table = RoutingTable::new(AddressFamily::Ipv4Unicast);
        table.insert_path("10.0.2.0/24", "192.168.1.9".parse().unwrap());
        table.insert_path("10.0.3.0/24", "192.168.1.10".parse().unwrap());
        let normalized = normalize(&table);
        assert_eq!(
            normalized.sorted(),
            vec![
                dest("10.0.2.0/24 -> 192.168.1.9"),
                dest("10.0.3.0/24 -> 192.168.1.10"),
            ]
        );
    }

    #[test]
    fn test_normalize_skips_ambiguous_entries() {
        let mut table = RoutingTable::new(AddressFamily::Ipv4Unicast);
        table.insert_path("10.0.1.0/24", "192.168.1.1".parse().unwrap());
        table.insert_path("10.0.1.0/24", "192.168.1.2".parse().unwrap());
        table.insert_path("10.0.2.0/24", "192.168.1.9".parse().unwrap());
        table
            .destinations
            .insert("10.0.4.0/24".to_string(), RibDestination { paths: vec![] });
        let normalized = normalize(&table);
        assert_eq!(normalized.sorted(), vec![dest("10.0.2.0/24 -> 192.168.1.9")]);
    }

    #[test]
    fn test_normalize_skips_bad_prefix() {
        let mut table = RoutingTable::new(AddressFamily::Ipv4Unicast);
        table.destinations.insert(
            "garbage".to_string(),
            RibDestination {
                paths: vec![KnownPath::new("192.168.1.1".parse().unwrap())],
            },
        );
        table.insert_path("10.0.2.0/24", "192.168.1.9".parse().unwrap());
        assert_eq!(normalize(&table).len(), 1);
    }

    #[test]
    fn test_normalize_empty_table() {
        let table = RoutingTable::new(AddressFamily::Ipv6Unicast);
        assert!(normalize(&table).is_empty());
    }
}
