pub mod outbound;

pub use outbound::{MockNodeManager, NodeCall, NodeManager};
