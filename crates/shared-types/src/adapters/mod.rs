//! # Adapters
//!
//! In-process implementations of the collaborator ports. The in-memory
//! store and key store back unit tests and single-process deployments; the
//! audit adapters forward events to `tracing` or keep them for inspection.

pub mod audit;
pub mod memory;

pub use audit::{RecordingAuditSink, TracingAuditSink};
pub use memory::{InMemoryKeyStore, InMemoryRecordStore, RecordSnapshot};
