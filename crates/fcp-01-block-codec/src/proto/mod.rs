//! # Fabric Protobuf Messages
//!
//! Message definitions for the subset of the Hyperledger Fabric protos the
//! control plane reads and writes, declared with `prost` derives. Package
//! layout mirrors the upstream `.proto` files (`common`, `msp`, `orderer`,
//! `orderer.etcdraft`, `peer`).
//!
//! Maps use `BTreeMap` so that re-encoding a configuration is deterministic:
//! signatures over a marshaled config update must be reproducible.

pub mod common;
pub mod msp;
pub mod orderer;
pub mod peer;
