use std::fmt;
use std::time::Duration;

use itertools::Itertools;
use log::{info, warn};
use thiserror::Error;

use crate::api::PathSpec;
use crate::models::Destination;
use crate::rib::Diff;
use crate::speaker::{bounded, RouteControl, SpeakerError};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathOp {
    Add,
    Remove,
}

impl fmt::Display for PathOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PathOp::Add => write!(f, "add"),
            PathOp::Remove => write!(f, "remove"),
        }
    }
}

#[derive(Debug)]
pub struct ApplyFailure {
    pub op: PathOp,
    pub destination: Destination,
    pub error: SpeakerError,
}

impl fmt::Display for ApplyFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "failed to {} route {}: {}",
            self.op, self.destination, self.error
        )
    }
}

/// Every per-destination failure from one apply pass
#[derive(Debug, Error)]
#[error("{} route changes failed: [{}]", .failures.len(), .failures.iter().join("; "))]
pub struct ApplyError {
    pub failures: Vec<ApplyFailure>,
}

/// Withdraw `remove` then announce `add`, one call per destination
///
/// A failed call is recorded and the rest of the batch still goes out.
/// Removals go first since the speaker keys withdrawals by prefix only,
/// so a next hop change must not withdraw the freshly added path.
pub(super) async fn apply<R: RouteControl + ?Sized>(
    control: &R,
    changes: &Diff,
    limit: Duration,
) -> Result<(), ApplyError> {
    let mut failures = Vec::new();

    for destination in changes.remove.sorted() {
        let path = PathSpec::withdraw(&destination);
        match bounded("delete_path", limit, control.delete_path(path)).await {
            Ok(_) => info!("Removed route {}", destination),
            Err(error) => {
                warn!("Failed to remove route {}: {}", destination, error);
                failures.push(ApplyFailure {
                    op: PathOp::Remove,
                    destination,
                    error,
                });
            }
        }
    }

    for destination in changes.add.sorted() {
        let path = PathSpec::announce(&destination);
        match bounded("add_path", limit, control.add_path(path)).await {
            Ok(ack) => match ack.uuid {
                Some(uuid) => info!("Added route {} [{}]", destination, uuid),
                None => info!("Added route {}", destination),
            },
            Err(error) => {
                warn!("Failed to add route {}: {}", destination, error);
                failures.push(ApplyFailure {
                    op: PathOp::Add,
                    destination,
                    error,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(ApplyError { failures })
    }
}
