pub mod config;
pub mod errors;
pub mod locks;
pub mod outcomes;

pub use config::DeployerConfig;
pub use errors::DeployerError;
pub use locks::NetworkLocks;
pub use outcomes::{ConfigUpdateOutcome, OrgUpdateOutcome, RefreshStatus, ReloadedBlock};
