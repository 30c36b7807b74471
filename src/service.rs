use std::error::Error;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use log::{debug, error, info, trace, warn};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::models::Topology;
use crate::publisher::{FilePublisher, Publisher, PublisherArgs};
use crate::speaker::RpcConnector;
use crate::topology::{HttpTopologySource, TopologyPoller};
use crate::worker::{snapshot_channel, ReconcileWorker, SnapshotTx, TopologySnapshot};

/// Takes each polled topology, publishes it, then hands it to the worker
pub struct Dispatcher {
    hostname: String,
    router_id: String,
    publisher: Option<Box<dyn Publisher>>,
    snapshots: SnapshotTx,
}

impl Dispatcher {
    pub fn new(
        hostname: &str,
        router_id: &str,
        publisher: Option<Box<dyn Publisher>>,
        snapshots: SnapshotTx,
    ) -> Self {
        Self {
            hostname: hostname.to_string(),
            router_id: router_id.to_string(),
            publisher,
            snapshots,
        }
    }

    /// Publish failures are logged and the worker still gets the topology
    pub fn dispatch(&mut self, topology: Topology) {
        let started = Instant::now();
        if let Some(publisher) = self.publisher.as_mut() {
            let args = PublisherArgs {
                hostname: &self.hostname,
                router_id: &self.router_id,
                topology: &topology,
            };
            if let Err(err) = publisher.update(&args) {
                error!("{}", err);
            }
        }
        // Replaces any snapshot the worker hasn't picked up yet
        self.snapshots
            .send_replace(Some(Arc::new(TopologySnapshot::new(topology))));
        trace!("Dispatched topology in {:?}", started.elapsed());
    }

    pub async fn run(mut self, mut topologies: mpsc::Receiver<Topology>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = topologies.recv() => match received {
                    Some(topology) => self.dispatch(topology),
                    None => break,
                },
            }
        }
        debug!("Dispatcher stopped");
    }
}

/// Run until Ctrl-C: topology poller, dispatcher, and (when a speaker is
/// configured) the reconciliation worker
pub async fn serve(config: Config) -> Result<(), Box<dyn Error>> {
    info!(
        "Starting route-publisher for {} [router-id {}]",
        config.hostname, config.router_id
    );
    let cancel = CancellationToken::new();

    let source = HttpTopologySource::new(&config.topology_url, config.poll_interval)?;
    let publisher = match &config.publish_path {
        Some(path) => {
            info!("Publishing topology to {}", path.display());
            Some(Box::new(FilePublisher::new(path)?) as Box<dyn Publisher>)
        }
        None => None,
    };

    let (topology_tx, topology_rx) = mpsc::channel(1);
    let (snapshot_tx, snapshot_rx) = snapshot_channel();

    let mut tasks = Vec::with_capacity(3);
    info!(
        "Polling {} every {:?}",
        config.topology_url, config.poll_interval
    );
    let poller = TopologyPoller::new(source, config.poll_interval, topology_tx);
    tasks.push(tokio::spawn(poller.run(cancel.clone())));

    let dispatcher = Dispatcher::new(
        &config.hostname,
        &config.router_id,
        publisher,
        snapshot_tx,
    );
    tasks.push(tokio::spawn(dispatcher.run(topology_rx, cancel.clone())));

    match &config.speaker {
        Some(speaker) => {
            let connector = RpcConnector::new(
                &speaker.endpoint,
                speaker.connect_timeout,
                speaker.request_timeout,
            );
            let worker = ReconcileWorker::new(
                connector,
                speaker.families.clone(),
                speaker.connect_timeout,
                speaker.request_timeout,
            );
            tasks.push(tokio::spawn(worker.run(
                snapshot_rx,
                speaker.reconcile_interval,
                cancel.clone(),
            )));
        }
        None => warn!("No speaker endpoint configured, routes will not be reconciled"),
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Stopping route-publisher..."),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
    cancel.cancel();

    for result in join_all(tasks).await {
        if let Err(err) = result {
            error!("Task failed during shutdown: {}", err);
        }
    }
    info!("Stopped");
    Ok(())
}
