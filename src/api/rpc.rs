use std::collections::HashMap;
use std::net::IpAddr;

use jsonrpsee::{core::RpcResult, proc_macros::rpc};
use serde::{self, Deserialize, Serialize};

use crate::models::Destination;
use crate::rib::AddressFamily;

/// Route-control surface of the BGP speaker
#[rpc(client)]
pub trait Speaker {
    #[method(name = "get_rib")]
    async fn get_rib(&self, family: AddressFamily) -> RpcResult<RoutingTable>;
    #[method(name = "add_path")]
    async fn add_path(&self, path: PathSpec) -> RpcResult<PathAck>;
    #[method(name = "delete_path")]
    async fn delete_path(&self, path: PathSpec) -> RpcResult<PathAck>;
}

/// Speaker's current table for one address family
///   Keyed by prefix string (E.g. "10.0.0.0/24")
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RoutingTable {
    pub family: Option<AddressFamily>,
    #[serde(default = "HashMap::new")]
    pub destinations: HashMap<String, RibDestination>,
}

impl RoutingTable {
    pub fn new(family: AddressFamily) -> Self {
        Self {
            family: Some(family),
            destinations: HashMap::new(),
        }
    }

    /// Add a known path for a prefix
    pub fn insert_path(&mut self, prefix: &str, next_hop: IpAddr) {
        self.destinations
            .entry(prefix.to_string())
            .or_insert_with(RibDestination::default)
            .paths
            .push(KnownPath::new(next_hop));
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RibDestination {
    #[serde(default = "Vec::new")]
    pub paths: Vec<KnownPath>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct KnownPath {
    pub next_hop: IpAddr,
    pub origin: Option<Origin>,
}

impl KnownPath {
    pub fn new(next_hop: IpAddr) -> Self {
        Self {
            next_hop,
            origin: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Igp,
    Egp,
    Incomplete,
}

/// API Input for a path to add or withdraw
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PathSpec {
    pub family: AddressFamily,
    /// Network address of the prefix (E.g. "10.0.0.0")
    pub prefix: IpAddr,
    pub prefix_len: u8,
    /// Only carried when announcing; withdrawals are keyed by prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_hop: Option<IpAddr>,
    pub origin: Origin,
}

impl PathSpec {
    pub fn announce(destination: &Destination) -> Self {
        Self {
            family: destination.family(),
            prefix: destination.prefix,
            prefix_len: destination.mask,
            next_hop: Some(destination.next_hop),
            origin: Origin::Incomplete,
        }
    }

    pub fn withdraw(destination: &Destination) -> Self {
        Self {
            family: destination.family(),
            prefix: destination.prefix,
            prefix_len: destination.mask,
            next_hop: None,
            origin: Origin::Incomplete,
        }
    }

    pub fn cidr(&self) -> String {
        format!("{}/{}", self.prefix, self.prefix_len)
    }
}

/// Speaker acknowledgement of an add/delete
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PathAck {
    /// Speaker-assigned identifier for the path, if it issues one
    pub uuid: Option<String>,
}
