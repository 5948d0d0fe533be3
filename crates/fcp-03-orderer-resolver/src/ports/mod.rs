pub mod outbound;

pub use outbound::{ConfigBlockSource, MockConfigBlockSource};
