mod apply;
mod snapshot;

pub use apply::{ApplyError, ApplyFailure, PathOp};
pub use snapshot::{snapshot_channel, SnapshotRx, SnapshotTx, TopologySnapshot};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, trace, warn};
use thiserror::Error;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::models::DestinationSet;
use crate::rib::{diff, AddressFamily};
use crate::speaker::{bounded, read_rib, Connector, RouteControl, SpeakerError};
use crate::topology::flatten;

#[derive(Debug, Error)]
pub enum TickError {
    /// Could not reach the speaker, nothing was read or applied
    #[error("Reconciliation skipped: {0}")]
    Connect(SpeakerError),
    #[error("Failed to read RIB: {0}")]
    ReadRib(SpeakerError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WorkerState {
    Disconnected,
    Connected,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let word = match self {
            WorkerState::Disconnected => "Disconnected",
            WorkerState::Connected => "Connected",
        };
        write!(f, "{}", word)
    }
}

enum Connection<T> {
    Disconnected,
    Connected(T),
}

/// Summary of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub desired: usize,
    pub actual: usize,
    pub added: usize,
    pub removed: usize,
    /// Age of the topology used, None if no topology has arrived yet
    pub topology_age: Option<String>,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.removed > 0
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "<ReconcileReport desired={} actual={} added={} removed={} topology_age={}>",
            self.desired,
            self.actual,
            self.added,
            self.removed,
            self.topology_age.as_deref().unwrap_or("none"),
        )
    }
}

/// Keeps the speaker's RIB converged on the latest topology
///
/// Owns the speaker connection and the last received topology. Each tick
/// connects if needed, then reads the RIB, diffs it against the flattened
/// topology and applies the changes. Any failure drops the connection so
/// the next tick starts from a fresh one.
pub struct ReconcileWorker<C: Connector> {
    connector: C,
    connection: Connection<C::Control>,
    families: Vec<AddressFamily>,
    connect_timeout: Duration,
    call_timeout: Duration,
    topology: Option<Arc<TopologySnapshot>>,
}

impl<C: Connector> ReconcileWorker<C> {
    /// `connect_timeout` bounds opening a connection, `call_timeout` bounds
    /// each RIB read and add/delete call
    pub fn new(
        connector: C,
        families: Vec<AddressFamily>,
        connect_timeout: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self {
            connector,
            connection: Connection::Disconnected,
            families,
            connect_timeout,
            call_timeout,
            topology: None,
        }
    }

    pub fn state(&self) -> WorkerState {
        match self.connection {
            Connection::Disconnected => WorkerState::Disconnected,
            Connection::Connected(_) => WorkerState::Connected,
        }
    }

    pub fn topology(&self) -> Option<&Arc<TopologySnapshot>> {
        self.topology.as_ref()
    }

    /// Replace the retained topology, no reconciliation happens here
    pub fn update_topology(&mut self, snapshot: Arc<TopologySnapshot>) {
        debug!(
            "Worker received topology [{} networks, {} hosts]",
            snapshot.topology.len(),
            snapshot.topology.host_count()
        );
        self.topology = Some(snapshot);
    }

    /// Destinations the retained topology asks for, limited to managed families
    pub fn desired(&self) -> DestinationSet {
        let mut desired = match &self.topology {
            Some(snapshot) => flatten(&snapshot.topology),
            None => DestinationSet::new(),
        };
        let total = desired.len();
        desired.retain_families(&self.families);
        if desired.len() != total {
            debug!(
                "Skipped {} destinations outside of managed families",
                total - desired.len()
            );
        }
        desired
    }

    fn update_connection(&mut self, connection: Connection<C::Control>) {
        let old = self.state();
        self.connection = connection;
        let new = self.state();
        if old != new {
            info!("Worker went from {} to {}", old, new);
        }
    }

    /// Run one state machine step
    pub async fn tick(&mut self) -> Result<ReconcileReport, TickError> {
        let usable = match &self.connection {
            Connection::Connected(control) => control.is_connected(),
            Connection::Disconnected => false,
        };
        if !usable {
            if self.state() == WorkerState::Connected {
                warn!("Speaker connection lost, reconnecting");
                self.update_connection(Connection::Disconnected);
            }
            let control = self.connect().await?;
            self.update_connection(Connection::Connected(control));
        }
        let result = match &self.connection {
            Connection::Connected(control) => self.reconcile(control).await,
            Connection::Disconnected => return Err(TickError::Connect(SpeakerError::Disconnected)),
        };
        if result.is_err() {
            debug!("Dropping speaker connection after failed reconciliation");
            self.update_connection(Connection::Disconnected);
        }
        result
    }

    async fn connect(&self) -> Result<C::Control, TickError> {
        bounded("connect", self.connect_timeout, self.connector.connect())
            .await
            .map_err(TickError::Connect)
    }

    async fn reconcile(&self, control: &C::Control) -> Result<ReconcileReport, TickError> {
        let actual = read_rib(control, &self.families, self.call_timeout)
            .await
            .map_err(TickError::ReadRib)?;
        if self.topology.is_none() {
            warn!("No topology received yet, reconciling against an empty set");
        }
        let desired = self.desired();
        trace!("Merging desired\n{}\ninto actual\n{}", desired, actual);

        let changes = diff(&actual, &desired);
        if !changes.is_empty() {
            debug!("Adding\n{}\nremoving\n{}", changes.add, changes.remove);
        }
        apply::apply(control, &changes, self.call_timeout).await?;

        Ok(ReconcileReport {
            desired: desired.len(),
            actual: actual.len(),
            added: changes.add.len(),
            removed: changes.remove.len(),
            topology_age: self.topology.as_ref().map(|s| s.age()),
        })
    }

    /// Tick on `period` until cancelled, picking up new topology
    /// snapshots as they arrive
    pub async fn run(
        mut self,
        mut updates: SnapshotRx,
        period: Duration,
        cancel: CancellationToken,
    ) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut updates_open = true;
        info!("Starting reconciliation worker [interval {:?}]", period);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                changed = updates.changed(), if updates_open => {
                    if changed.is_err() {
                        debug!("Topology sender dropped, keeping last topology");
                        updates_open = false;
                        continue;
                    }
                    let latest = updates.borrow_and_update().clone();
                    if let Some(snapshot) = latest {
                        self.update_topology(snapshot);
                    }
                },
                _ = ticker.tick() => {
                    // Abandon an in-flight tick on shutdown
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = self.log_tick() => (),
                    }
                },
            }
        }
        info!("Reconciliation worker stopped");
    }

    async fn log_tick(&mut self) {
        let started = Instant::now();
        match self.tick().await {
            Ok(report) if report.changed() => info!("Reconciled {}", report),
            Ok(report) => debug!("Reconciled {}", report),
            Err(TickError::Connect(err)) => error!("{}", err),
            Err(err) => warn!("{}", err),
        }
        trace!("Reconciliation tick took {:?}", started.elapsed());
    }
}

#[cfg(test)]
pub(crate) mod fake;
