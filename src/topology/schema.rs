use std::collections::BTreeMap;

use log::{error, warn};
use serde::Deserialize;

use super::TopologyError;
use crate::models::{PrefixGroups, Topology};

/// Topology document as served by the cluster's topology endpoint
#[derive(Debug, Default, Deserialize)]
pub struct TopologyDocument {
    #[serde(default = "Vec::new", alias = "Topologies")]
    pub topologies: Vec<TopologyDefinition>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopologyDefinition {
    // Only the first entry names the network
    #[serde(default = "Vec::new", alias = "Networks")]
    pub networks: Vec<String>,
    #[serde(default = "Vec::new", alias = "Map")]
    pub map: Vec<GroupOrHost>,
}

/// Tree node: a group (optionally carrying a CIDR) or a host (carrying an IP)
#[derive(Debug, Default, Deserialize)]
pub struct GroupOrHost {
    #[serde(alias = "Name")]
    pub name: Option<String>,
    #[serde(alias = "Hostname")]
    pub hostname: Option<String>,
    #[serde(alias = "IP")]
    pub ip: Option<String>,
    #[serde(alias = "CIDR")]
    pub cidr: Option<String>,
    #[serde(default = "Vec::new", alias = "Groups")]
    pub groups: Vec<GroupOrHost>,
}

impl GroupOrHost {
    fn ip(&self) -> Option<&str> {
        self.ip.as_deref().map(str::trim).filter(|ip| !ip.is_empty())
    }

    fn cidr(&self) -> Option<&str> {
        self.cidr.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    fn label(&self) -> &str {
        self.hostname
            .as_deref()
            .or_else(|| self.name.as_deref())
            .unwrap_or("<unnamed>")
    }
}

impl TopologyDocument {
    pub fn from_slice(data: &[u8]) -> Result<Self, TopologyError> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Collect `prefix-group => [host, ...]` relations for every network
    pub fn into_topology(self) -> Result<Topology, TopologyError> {
        let mut topology = Topology::new();
        for (index, definition) in self.topologies.iter().enumerate() {
            let name = match definition.networks.first() {
                Some(name) => name,
                None => return Err(TopologyError::NoNetworks(index)),
            };
            let mut groups: PrefixGroups = BTreeMap::new();
            for node in definition.map.iter() {
                walk(node, None, &mut groups);
            }
            if topology.insert_network(name, groups).is_some() {
                warn!("Network {} defined more than once, keeping the last", name);
            }
        }
        Ok(topology)
    }
}

/// Walk a group/host tree, recording each host under its nearest enclosing CIDR.
/// A host with no enclosing CIDR is dropped along with its subtree.
fn walk(node: &GroupOrHost, enclosing: Option<&str>, collector: &mut PrefixGroups) {
    if let Some(ip) = node.ip() {
        match enclosing {
            Some(cidr) => collector
                .entry(cidr.to_string())
                .or_insert_with(Vec::new)
                .push(ip.to_string()),
            None => {
                error!(
                    "Can not detect host group for host: {} ({})",
                    ip,
                    node.label()
                );
                return;
            }
        }
    }
    let enclosing = node.cidr().or(enclosing);
    for child in node.groups.iter() {
        walk(child, enclosing, collector);
    }
}
