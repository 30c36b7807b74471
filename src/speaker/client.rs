use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};
use log::debug;

use super::{Connector, RouteControl, SpeakerError};
use crate::api::{PathAck, PathSpec, RoutingTable, SpeakerClient};
use crate::rib::AddressFamily;

/// Connects to the speaker's JSON-RPC (websocket) control endpoint
#[derive(Clone, Debug)]
pub struct RpcConnector {
    endpoint: String,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl RpcConnector {
    pub fn new(endpoint: &str, connect_timeout: Duration, request_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            connect_timeout,
            request_timeout,
        }
    }
}

#[async_trait]
impl Connector for RpcConnector {
    type Control = RpcSpeaker;

    async fn connect(&self) -> Result<RpcSpeaker, SpeakerError> {
        debug!("Connecting to speaker at {}", self.endpoint);
        let client = WsClientBuilder::default()
            .connection_timeout(self.connect_timeout)
            .request_timeout(self.request_timeout)
            .build(&self.endpoint)
            .await
            .map_err(|err| SpeakerError::Connect {
                endpoint: self.endpoint.clone(),
                reason: err.to_string(),
            })?;
        Ok(RpcSpeaker {
            endpoint: self.endpoint.clone(),
            client,
        })
    }
}

/// An open connection to the speaker
pub struct RpcSpeaker {
    endpoint: String,
    client: WsClient,
}

// The background task is gone once the client needs a restart
fn rpc_error(err: jsonrpsee::core::Error) -> SpeakerError {
    match err {
        jsonrpsee::core::Error::RestartNeeded(_) => SpeakerError::Disconnected,
        err => SpeakerError::Rpc(err),
    }
}

#[async_trait]
impl RouteControl for RpcSpeaker {
    async fn get_rib(&self, family: AddressFamily) -> Result<RoutingTable, SpeakerError> {
        SpeakerClient::get_rib(&self.client, family)
            .await
            .map_err(rpc_error)
    }

    async fn add_path(&self, path: PathSpec) -> Result<PathAck, SpeakerError> {
        SpeakerClient::add_path(&self.client, path)
            .await
            .map_err(rpc_error)
    }

    async fn delete_path(&self, path: PathSpec) -> Result<PathAck, SpeakerError> {
        SpeakerClient::delete_path(&self.client, path)
            .await
            .map_err(rpc_error)
    }

    fn is_connected(&self) -> bool {
        self.client.is_connected()
    }
}

impl fmt::Display for RpcSpeaker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<RpcSpeaker {}>", self.endpoint)
    }
}
