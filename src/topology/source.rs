use std::time::Duration;

use async_trait::async_trait;
use log::trace;

use super::{TopologyDocument, TopologyError, TopologySource};
use crate::models::Topology;

/// Reads the topology description over HTTP(S)
pub struct HttpTopologySource {
    client: reqwest::Client,
    url: String,
}

impl HttpTopologySource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, TopologyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl TopologySource for HttpTopologySource {
    async fn fetch(&self) -> Result<Topology, TopologyError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        trace!("Read {} bytes of topology from {}", body.len(), self.url);
        TopologyDocument::from_slice(&body)?.into_topology()
    }
}
