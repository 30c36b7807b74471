use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Hosts grouped by prefix-group CIDR, per network
///   network name -> prefix-group CIDR -> [host IP, ...]
///
/// Prefix groups and host IPs are kept as received; they are only
/// validated when the topology is flattened into destinations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topology(BTreeMap<String, BTreeMap<String, Vec<String>>>);

pub type PrefixGroups = BTreeMap<String, Vec<String>>;

impl Topology {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of networks
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn networks(&self) -> btree_map::Iter<String, PrefixGroups> {
        self.0.iter()
    }

    pub fn network(&self, name: &str) -> Option<&PrefixGroups> {
        self.0.get(name)
    }

    /// Set (or replace) the prefix groups of a network.
    /// Returns the previous groups if the network was already present.
    pub fn insert_network(&mut self, name: &str, groups: PrefixGroups) -> Option<PrefixGroups> {
        self.0.insert(name.to_string(), groups)
    }

    /// Append a host to a prefix group, creating the network/group if needed
    pub fn insert_host(&mut self, network: &str, prefix_group: &str, host: &str) {
        self.0
            .entry(network.to_string())
            .or_insert_with(BTreeMap::new)
            .entry(prefix_group.to_string())
            .or_insert_with(Vec::new)
            .push(host.to_string());
    }

    /// Total host entries across all networks and groups
    pub fn host_count(&self) -> usize {
        self.0
            .values()
            .flat_map(|groups| groups.values())
            .map(|hosts| hosts.len())
            .sum()
    }
}
