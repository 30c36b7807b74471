mod client;

pub use client::{RpcConnector, RpcSpeaker};

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::trace;
use thiserror::Error;

use crate::api::{PathAck, PathSpec, RoutingTable};
use crate::models::DestinationSet;
use crate::rib::{normalize, AddressFamily};

#[derive(Debug, Error)]
pub enum SpeakerError {
    #[error("Failed to connect to speaker at {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },
    #[error("Speaker {op} timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },
    #[error("Speaker RPC error: {0}")]
    Rpc(#[from] jsonrpsee::core::Error),
    #[error("Speaker connection lost")]
    Disconnected,
}

/// Opens connections to the speaker's control endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    type Control: RouteControl;

    async fn connect(&self) -> Result<Self::Control, SpeakerError>;
}

/// Route-control calls available on an open speaker connection
#[async_trait]
pub trait RouteControl: Send + Sync {
    async fn get_rib(&self, family: AddressFamily) -> Result<RoutingTable, SpeakerError>;
    async fn add_path(&self, path: PathSpec) -> Result<PathAck, SpeakerError>;
    async fn delete_path(&self, path: PathSpec) -> Result<PathAck, SpeakerError>;

    /// Whether the underlying transport is still usable
    fn is_connected(&self) -> bool {
        true
    }
}

/// Run a speaker operation, treating `limit` expiring like any other failure
pub async fn bounded<T, F>(op: &'static str, limit: Duration, fut: F) -> Result<T, SpeakerError>
where
    F: Future<Output = Result<T, SpeakerError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(SpeakerError::Timeout { op, after: limit }),
    }
}

/// Read and normalize the speaker's RIB for each family
pub async fn read_rib<R: RouteControl + ?Sized>(
    control: &R,
    families: &[AddressFamily],
    limit: Duration,
) -> Result<DestinationSet, SpeakerError> {
    let mut actual = DestinationSet::new();
    for family in families {
        let table = bounded("get_rib", limit, control.get_rib(*family)).await?;
        trace!(
            "Read {} {} entries from speaker",
            table.destinations.len(),
            family
        );
        actual.extend(normalize(&table));
    }
    Ok(actual)
}
