use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use serde::{self, Deserialize};

use crate::rib::AddressFamily;

struct Defaults {}

impl Defaults {
    fn topology_url() -> String {
        "http://localhost:9600/topology".to_string()
    }

    fn poll_interval() -> u16 {
        2
    }

    fn enabled() -> bool {
        true
    }

    fn connect_timeout_ms() -> u64 {
        2000
    }

    fn request_timeout_ms() -> u64 {
        2000
    }

    fn families() -> Vec<AddressFamily> {
        vec![AddressFamily::Ipv4Unicast]
    }
}

/// Config (toml) representation of the speaker connection
#[derive(Clone, Debug, Deserialize)]
pub(super) struct SpeakerSpec {
    // JSON-RPC control endpoint (E.g. "ws://127.0.0.1:50052")
    // Reconciliation is disabled when not provided
    pub(super) endpoint: Option<String>,

    #[serde(default = "Defaults::enabled")]
    pub(super) enabled: bool,

    // Seconds between reconciliation passes, defaults to poll_interval
    pub(super) reconcile_interval: Option<u16>,

    #[serde(default = "Defaults::connect_timeout_ms")]
    pub(super) connect_timeout_ms: u64,

    // Bound on each RIB read & add/delete call
    #[serde(default = "Defaults::request_timeout_ms")]
    pub(super) request_timeout_ms: u64,

    // Families whose RIB this agent owns
    #[serde(default = "Defaults::families")]
    pub(super) families: Vec<AddressFamily>,
}

/// Used when the file has no [speaker] table
impl Default for SpeakerSpec {
    fn default() -> Self {
        Self {
            endpoint: None,
            enabled: Defaults::enabled(),
            reconcile_interval: None,
            connect_timeout_ms: Defaults::connect_timeout_ms(),
            request_timeout_ms: Defaults::request_timeout_ms(),
            families: Defaults::families(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct PublishSpec {
    // Where to write {Hostname, RouterID, Topology} for the config renderer
    pub(super) path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ConfigSpec {
    // Name of this host in the topology (system hostname if not provided)
    pub(super) hostname: Option<String>,
    // Router-ID handed to the publisher (hostname if not provided)
    pub(super) router_id: Option<String>,

    #[serde(default = "Defaults::topology_url")]
    pub(super) topology_url: String,

    // Seconds between topology polls
    #[serde(default = "Defaults::poll_interval")]
    pub(super) poll_interval: u16,

    pub(super) speaker: Option<SpeakerSpec>,
    pub(super) publish: Option<PublishSpec>,
}

impl ConfigSpec {
    pub(super) fn from_file(path: &str) -> io::Result<Result<Self, toml::de::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(Self::from_toml(&contents))
    }

    pub(super) fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
