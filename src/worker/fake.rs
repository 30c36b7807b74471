//! In-memory speaker used to exercise the worker without a network

use std::collections::{BTreeMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use jsonrpsee::core::Error as RpcError;
use tokio::time::sleep;

use crate::api::{PathAck, PathSpec, RoutingTable};
use crate::models::Destination;
use crate::rib::AddressFamily;
use crate::speaker::{Connector, RouteControl, SpeakerError};
use crate::utils::parse_prefix;

#[derive(Default)]
struct FakeState {
    // prefix -> known next hops
    rib: BTreeMap<String, Vec<IpAddr>>,
    calls: Vec<String>,
    added: Vec<Destination>,
    deleted: Vec<String>,
    rejected: HashSet<String>,
    fail_connects: bool,
    fail_rib_reads: bool,
    connect_delay: Option<Duration>,
    call_delay: Option<Duration>,
    connect_attempts: usize,
    connects: usize,
    rib_reads: usize,
    generation: usize,
}

#[derive(Clone, Default)]
pub struct FakeSpeaker {
    state: Arc<Mutex<FakeState>>,
    generation: usize,
}

impl FakeSpeaker {
    pub fn with_routes(routes: &[&str]) -> Self {
        let speaker = Self::default();
        {
            let mut state = speaker.lock();
            for route in routes {
                let dest: Destination = route.parse().unwrap();
                state.rib.entry(dest.cidr()).or_default().push(dest.next_hop);
            }
        }
        speaker
    }

    fn lock(&self) -> MutexGuard<FakeState> {
        self.state.lock().unwrap()
    }

    /// Add another known path for a prefix already in the RIB
    pub fn add_known_path(&self, route: &str) {
        let dest: Destination = route.parse().unwrap();
        self.lock().rib.entry(dest.cidr()).or_default().push(dest.next_hop);
    }

    pub fn fail_connects(&self, fail: bool) {
        self.lock().fail_connects = fail;
    }

    pub fn fail_rib_reads(&self, fail: bool) {
        self.lock().fail_rib_reads = fail;
    }

    /// Hold each connect attempt this long before answering
    pub fn delay_connects(&self, delay: Duration) {
        self.lock().connect_delay = Some(delay);
    }

    /// Hold each add/delete call this long before answering
    pub fn stall_calls(&self, delay: Duration) {
        self.lock().call_delay = Some(delay);
    }

    /// Reject any add/delete for this prefix
    pub fn reject(&self, cidr: &str) {
        self.lock().rejected.insert(cidr.to_string());
    }

    pub fn clear_rejections(&self) {
        self.lock().rejected.clear();
    }

    /// Mark every open connection as lost
    pub fn drop_connections(&self) {
        self.lock().generation += 1;
    }

    /// Single-path RIB entries, sorted
    pub fn rib(&self) -> Vec<Destination> {
        let state = self.lock();
        let mut rib: Vec<Destination> = state
            .rib
            .iter()
            .filter(|(_, hops)| hops.len() == 1)
            .map(|(cidr, hops)| {
                let (prefix, mask) = parse_prefix(cidr).unwrap();
                Destination::new(prefix, mask, hops[0])
            })
            .collect();
        rib.sort();
        rib
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn added(&self) -> Vec<Destination> {
        self.lock().added.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.lock().deleted.clone()
    }

    pub fn connect_attempts(&self) -> usize {
        self.lock().connect_attempts
    }

    pub fn connects(&self) -> usize {
        self.lock().connects
    }

    pub fn rib_reads(&self) -> usize {
        self.lock().rib_reads
    }
}

fn rejected(reason: String) -> SpeakerError {
    SpeakerError::Rpc(RpcError::Custom(reason))
}

impl FakeSpeaker {
    async fn stall(&self) {
        let delay = self.lock().call_delay;
        if let Some(delay) = delay {
            sleep(delay).await;
        }
    }
}

#[async_trait]
impl RouteControl for FakeSpeaker {
    async fn get_rib(&self, family: AddressFamily) -> Result<RoutingTable, SpeakerError> {
        let mut state = self.lock();
        if state.fail_rib_reads {
            return Err(rejected("RIB unavailable".to_string()));
        }
        state.rib_reads += 1;
        let mut table = RoutingTable::new(family);
        for (cidr, hops) in state.rib.iter() {
            if let Ok((prefix, _)) = parse_prefix(cidr) {
                if AddressFamily::of(&prefix) != family {
                    continue;
                }
            }
            for hop in hops {
                table.insert_path(cidr, *hop);
            }
        }
        Ok(table)
    }

    async fn add_path(&self, path: PathSpec) -> Result<PathAck, SpeakerError> {
        self.stall().await;
        let mut state = self.lock();
        let cidr = path.cidr();
        let next_hop = path
            .next_hop
            .ok_or_else(|| rejected("missing next hop".to_string()))?;
        let dest = Destination::new(path.prefix, path.prefix_len, next_hop);
        state.calls.push(format!("add {}", dest));
        if state.rejected.contains(&cidr) {
            return Err(rejected(format!("{} not allowed", cidr)));
        }
        state.rib.insert(cidr, vec![next_hop]);
        state.added.push(dest);
        Ok(PathAck::default())
    }

    async fn delete_path(&self, path: PathSpec) -> Result<PathAck, SpeakerError> {
        self.stall().await;
        let mut state = self.lock();
        let cidr = path.cidr();
        state.calls.push(format!("delete {}", cidr));
        if state.rejected.contains(&cidr) {
            return Err(rejected(format!("{} not allowed", cidr)));
        }
        state.rib.remove(&cidr);
        state.deleted.push(cidr);
        Ok(PathAck::default())
    }

    fn is_connected(&self) -> bool {
        self.lock().generation == self.generation
    }
}

pub struct FakeConnector {
    speaker: FakeSpeaker,
}

impl FakeConnector {
    pub fn new(speaker: FakeSpeaker) -> Self {
        Self { speaker }
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Control = FakeSpeaker;

    async fn connect(&self) -> Result<FakeSpeaker, SpeakerError> {
        let delay = self.speaker.lock().connect_delay;
        if let Some(delay) = delay {
            sleep(delay).await;
        }
        let mut state = self.speaker.lock();
        state.connect_attempts += 1;
        if state.fail_connects {
            return Err(SpeakerError::Connect {
                endpoint: "fake".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        state.connects += 1;
        Ok(FakeSpeaker {
            state: self.speaker.state.clone(),
            generation: state.generation,
        })
    }
}
