mod poller;
mod schema;
mod source;

pub use poller::TopologyPoller;
pub use schema::{GroupOrHost, TopologyDefinition, TopologyDocument};
pub use source::HttpTopologySource;

use async_trait::async_trait;
use log::error;
use thiserror::Error;

use crate::models::{Destination, DestinationSet, Topology};
use crate::utils::{parse_host, parse_prefix};

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("Failed to fetch topology: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Failed to decode topology: {0}")]
    Decode(#[from] serde_json::Error),
    /// Topology definition at [index] has no network names
    #[error("Can't parse topology #{0} which has 0 items in networks field")]
    NoNetworks(usize),
}

/// Somewhere a topology description can be read from
#[async_trait]
pub trait TopologySource: Send + Sync {
    async fn fetch(&self) -> Result<Topology, TopologyError>;
}

/// Convert a topology into the destinations it describes:
///   one per (prefix-group, host) pair, prefix-group CIDR as the prefix
///   and the host as the next hop
///
/// Malformed prefix groups and hosts are logged and skipped on their own,
/// without affecting their siblings.
pub fn flatten(topology: &Topology) -> DestinationSet {
    let mut result = DestinationSet::new();
    for (network, groups) in topology.networks() {
        for (prefix_group, hosts) in groups.iter() {
            let (prefix, mask) = match parse_prefix(prefix_group) {
                Ok(parsed) => parsed,
                Err(err) => {
                    error!(
                        "Failed to parse prefix group {} in network {}: {}",
                        prefix_group, network, err
                    );
                    continue;
                }
            };
            for host in hosts.iter() {
                match parse_host(host) {
                    Ok(next_hop) => {
                        result.insert(Destination::new(prefix, mask, next_hop));
                    }
                    Err(err) => error!("Failed to parse next hop {}: {}", host, err),
                }
            }
        }
    }
    result
}
