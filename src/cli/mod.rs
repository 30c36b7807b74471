//! # route-publisher CLI
//!
//! Runs the publisher daemon, or inspects what it would do against a live
//! topology service and speaker.
//!
//! ```sh
//! $ route-publisher -c demos/config.toml show diff
//! IPv4 Unicast
//!     Prefix       Next Hop   Family
//! -------------------------------------------
//!  +  10.0.1.0/24  10.0.0.2   IPv4 Unicast
//!  -  10.9.0.0/24  10.0.0.9   IPv4 Unicast
//! ```
//!
//! Settings from the config file can be overridden with flags
//! (E.g. `--url`, `--speaker`, `--poll-period`).

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use itertools::Itertools;

use crate::config::{Config, Overrides};
use crate::models::{Destination, DestinationSet};
use crate::rib::diff;
use crate::speaker::{bounded, read_rib, Connector, RpcConnector};
use crate::topology::{flatten, HttpTopologySource, TopologySource};
use crate::worker::PathOp;

mod display;
mod table;

use display::{ChangeRow, DestinationRow};
use table::OutputTable;

#[derive(Parser, Debug)]
#[clap(name = "route-publisher", rename_all = "kebab-case")]
/// Announce topology-derived routes to a BGP speaker
pub struct Args {
    #[clap(subcommand)]
    pub cmd: Option<Command>,
    /// Path to config.toml (all settings have defaults without one)
    #[clap(short, long, global = true)]
    pub config: Option<String>,
    /// Topology service URL
    #[clap(long, global = true)]
    pub url: Option<String>,
    /// Name of this host in the topology
    #[clap(long, global = true)]
    pub hostname: Option<String>,
    /// Router-ID handed to the publisher
    #[clap(long, global = true)]
    pub id: Option<String>,
    /// Seconds between topology polls
    #[clap(long, global = true)]
    pub poll_period: Option<u16>,
    /// Speaker control endpoint (E.g. ws://127.0.0.1:50052)
    #[clap(long, global = true)]
    pub speaker: Option<String>,
    /// Where to write the published topology JSON
    #[clap(long, global = true)]
    pub publish_path: Option<PathBuf>,
    /// Show debug logs (additive for trace logs)
    #[clap(short, parse(from_occurrences), global = true)]
    pub verbose: u8,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            hostname: self.hostname.clone(),
            router_id: self.id.clone(),
            topology_url: self.url.clone(),
            poll_interval: self.poll_period,
            speaker_endpoint: self.speaker.clone(),
            publish_path: self.publish_path.clone(),
        }
    }
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Run the publisher (default)
    Run,
    #[clap(alias = "s", subcommand)]
    /// Inspect topology, speaker RIB, or pending changes
    Show(Show),
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub enum Show {
    /// Destinations derived from the topology service
    #[clap(alias = "t")]
    Topology,
    /// Destinations currently in the speaker's RIB
    #[clap(alias = "r")]
    Rib,
    /// Changes the next reconciliation would make
    #[clap(alias = "d")]
    Diff,
}

async fn desired(config: &Config) -> Result<DestinationSet, Box<dyn Error>> {
    let source = HttpTopologySource::new(&config.topology_url, config.poll_interval)?;
    let topology = source.fetch().await?;
    let mut desired = flatten(&topology);
    if let Some(speaker) = &config.speaker {
        desired.retain_families(&speaker.families);
    }
    Ok(desired)
}

async fn actual(config: &Config) -> Result<DestinationSet, Box<dyn Error>> {
    let speaker = config
        .speaker
        .as_ref()
        .ok_or("No speaker endpoint configured (use --speaker)")?;
    let connector = RpcConnector::new(
        &speaker.endpoint,
        speaker.connect_timeout,
        speaker.request_timeout,
    );
    let control = bounded("connect", speaker.connect_timeout, connector.connect()).await?;
    Ok(read_rib(&control, &speaker.families, speaker.request_timeout).await?)
}

fn by_family(destinations: &DestinationSet) -> Vec<Destination> {
    let mut sorted = destinations.sorted();
    sorted.sort_by_key(|d| d.family());
    sorted
}

fn print_destinations(destinations: &DestinationSet) {
    for (family, dests) in &by_family(destinations)
        .into_iter()
        .group_by(|d| d.family())
    {
        println!("{}", family);
        let mut table = OutputTable::new();
        for dest in dests {
            table.add_row(&DestinationRow(dest));
        }
        table.print();
        println!();
    }
}

fn print_changes(actual: &DestinationSet, desired: &DestinationSet) {
    let changes = diff(actual, desired);
    if changes.is_empty() {
        println!("{}", "Speaker RIB matches topology".green());
        return;
    }
    let pending = by_family(&changes.remove)
        .into_iter()
        .map(|d| (PathOp::Remove, d))
        .chain(by_family(&changes.add).into_iter().map(|d| (PathOp::Add, d)))
        .sorted_by_key(|(_, d)| d.family());
    for (family, ops) in &pending.group_by(|(_, d)| d.family()) {
        println!("{}", family);
        let mut table = OutputTable::new();
        for (op, dest) in ops {
            table.add_row(&ChangeRow(op, dest));
        }
        table.print();
        println!();
    }
}

async fn run_cmd(show: &Show, config: &Config) -> Result<(), Box<dyn Error>> {
    match show {
        Show::Topology => print_destinations(&desired(config).await?),
        Show::Rib => print_destinations(&actual(config).await?),
        Show::Diff => {
            let (desired, actual) = tokio::try_join!(desired(config), actual(config))?;
            print_changes(&actual, &desired);
        }
    }
    Ok(())
}

/// One-shot inspection commands (other than running the daemon)
pub async fn query(show: &Show, config: &Config) {
    if let Err(err) = run_cmd(show, config).await {
        eprintln!("{}", err.to_string().red());
    }
}
