use std::fmt;
use std::time::Duration;

use log::{debug, error, trace};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::TopologySource;
use crate::models::Topology;

/// Fetches the topology every interval and hands each good snapshot on.
/// Fetch failures are logged here and never leave this task.
pub struct TopologyPoller<S: TopologySource> {
    source: S,
    interval: Duration,
    tx: mpsc::Sender<Topology>,
}

impl<S: TopologySource> TopologyPoller<S> {
    pub fn new(source: S, interval: Duration, tx: mpsc::Sender<Topology>) -> Self {
        Self {
            source,
            interval,
            tx,
        }
    }

    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => (),
            }
            trace!("Polling topology");
            let fetched = tokio::select! {
                _ = cancel.cancelled() => break,
                fetched = self.source.fetch() => fetched,
            };
            let topology = match fetched {
                Ok(topology) => topology,
                Err(err) => {
                    error!("{}", err);
                    continue;
                }
            };
            debug!(
                "Received topology [{} networks, {} hosts]",
                topology.len(),
                topology.host_count()
            );
            tokio::select! {
                _ = cancel.cancelled() => break,
                sent = self.tx.send(topology) => {
                    if sent.is_err() {
                        debug!("Topology receiver dropped, stopping poller");
                        break;
                    }
                }
            }
        }
        debug!("{} stopped", self);
    }
}

impl<S: TopologySource> fmt::Display for TopologyPoller<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<TopologyPoller interval={:?}>", self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::TopologyError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Fails every other fetch
    struct FlakySource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TopologySource for FlakySource {
        async fn fetch(&self) -> Result<Topology, TopologyError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call % 2 == 0 {
                return Err(TopologyError::NoNetworks(0));
            }
            let mut topology = Topology::new();
            topology.insert_host("net1", "10.0.0.0/24", &format!("10.0.0.{}", call));
            Ok(topology)
        }
    }

    #[tokio::test]
    async fn test_poller_skips_failed_fetches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::channel(1);
        let poller = TopologyPoller::new(
            FlakySource {
                calls: calls.clone(),
            },
            Duration::from_millis(5),
            tx,
        );
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poller.run(cancel.clone()));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.network("net1").unwrap()["10.0.0.0/24"], vec!["10.0.0.1"]);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.network("net1").unwrap()["10.0.0.0/24"], vec!["10.0.0.3"]);

        cancel.cancel();
        handle.await.unwrap();
        assert!(calls.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn test_poller_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let poller = TopologyPoller::new(
            FlakySource {
                calls: Arc::new(AtomicUsize::new(1)),
            },
            Duration::from_millis(5),
            tx,
        );
        // Returns without cancellation
        poller.run(CancellationToken::new()).await;
    }
}
