//! # Shared Types Crate
//!
//! Record-store entities, collaborator ports and error payloads shared by
//! every component of the Fabric control plane.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: rows read from and written to the record
//!   store are defined once, here.
//! - **Collaborators as Ports**: persistence, key management and auditing are
//!   traits; the pipeline never depends on a concrete backend.
//! - **Opaque Errors at the Edge**: component errors are rendered through
//!   [`ApiErrorPayload`], which carries a code and a message only.

pub mod adapters;
pub mod entities;
pub mod errors;
pub mod ports;

pub use entities::*;
pub use errors::*;
pub use ports::*;
