use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::models::Topology;
use crate::utils::format_time_as_elapsed;

/// Latest-value hand-off to the worker; a newer snapshot replaces an
/// unread older one and the sender never waits
pub type SnapshotTx = watch::Sender<Option<Arc<TopologySnapshot>>>;
pub type SnapshotRx = watch::Receiver<Option<Arc<TopologySnapshot>>>;

#[derive(Debug)]
pub struct TopologySnapshot {
    pub topology: Topology,
    pub received_at: DateTime<Utc>,
}

impl TopologySnapshot {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            received_at: Utc::now(),
        }
    }

    /// Time since the snapshot was received, formatted like "00:00:00"
    pub fn age(&self) -> String {
        format_time_as_elapsed(self.received_at)
    }
}

pub fn snapshot_channel() -> (SnapshotTx, SnapshotRx) {
    watch::channel(None)
}
