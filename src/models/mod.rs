mod destination;
mod topology;

pub use destination::{Destination, DestinationSet};
pub use topology::{PrefixGroups, Topology};
