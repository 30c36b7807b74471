//! Publishes a host's topology-derived routes into a BGP speaker and keeps
//! the speaker's RIB converged on them.
//!
//! A [`topology::TopologyPoller`] fetches the topology on an interval, the
//! [`service::Dispatcher`] publishes it and hands it to the
//! [`worker::ReconcileWorker`], which diffs it against the speaker's RIB
//! and applies the changes.

pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod publisher;
pub mod rib;
pub mod service;
pub mod speaker;
pub mod topology;
pub mod utils;
pub mod worker;
