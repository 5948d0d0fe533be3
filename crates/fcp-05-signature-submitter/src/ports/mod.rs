pub mod outbound;

pub use outbound::{BroadcastStatus, MockOrdererBroadcaster, OrdererBroadcaster};
