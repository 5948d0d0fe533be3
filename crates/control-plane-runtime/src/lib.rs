//! # Control Plane Runtime
//!
//! Library half of the `fcp` binary: configuration, adapter wiring and the
//! command set. Integration tests build a `ServiceContainer` over mock
//! ports; `main.rs` builds it over `Ports::production`.
//!
//! ## Crate Structure
//!
//! - `container/` - `ControlPlaneConfig` and the `ServiceContainer`
//! - `adapters/` - state file, key directory and gRPC clients
//! - `commands` - clap subcommands and their dispatch

pub mod adapters;
pub mod commands;
pub mod container;

pub use commands::{execute, Cli, Command, CommandError};
pub use container::{ControlPlaneConfig, Ports, ServiceContainer};
