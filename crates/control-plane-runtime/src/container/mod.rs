//! # Container
//!
//! Configuration loading and dependency wiring for the `fcp` binary.

pub mod config;
pub mod services;

pub use config::{ConfigError, ControlPlaneConfig, GrpcConfig, StorageConfig};
pub use services::{Ports, ServiceContainer};
