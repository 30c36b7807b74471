pub mod rpc;

pub use rpc::{KnownPath, Origin, PathAck, PathSpec, RibDestination, RoutingTable, SpeakerClient};
