//! `orderer` and `orderer.etcdraft` packages: ordering service configuration
//! values and the AtomicBroadcast wire messages.

use super::common::Block;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConsensusType {
    #[prost(string, tag = "1")]
    pub r#type: String,
    #[prost(bytes = "vec", tag = "2")]
    pub metadata: Vec<u8>,
    #[prost(enumeration = "consensus_type::State", tag = "3")]
    pub state: i32,
}

pub mod consensus_type {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum State {
        Normal = 0,
        Maintenance = 1,
    }
}

/// `ConsensusType.type` of a Raft ordering service.
pub const ETCDRAFT_CONSENSUS_TYPE: &str = "etcdraft";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchSize {
    #[prost(uint32, tag = "1")]
    pub max_message_count: u32,
    #[prost(uint32, tag = "2")]
    pub absolute_max_bytes: u32,
    #[prost(uint32, tag = "3")]
    pub preferred_max_bytes: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchTimeout {
    #[prost(string, tag = "1")]
    pub timeout: String,
}

pub mod etcdraft {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ConfigMetadata {
        #[prost(message, repeated, tag = "1")]
        pub consenters: Vec<Consenter>,
        #[prost(message, optional, tag = "2")]
        pub options: ::core::option::Option<Options>,
    }

    #[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
    pub struct Consenter {
        #[prost(string, tag = "1")]
        pub host: String,
        #[prost(uint32, tag = "2")]
        pub port: u32,
        #[prost(bytes = "vec", tag = "3")]
        pub client_tls_cert: Vec<u8>,
        #[prost(bytes = "vec", tag = "4")]
        pub server_tls_cert: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Options {
        #[prost(string, tag = "1")]
        pub tick_interval: String,
        #[prost(uint32, tag = "2")]
        pub election_tick: u32,
        #[prost(uint32, tag = "3")]
        pub heartbeat_tick: u32,
        #[prost(uint32, tag = "4")]
        pub max_inflight_blocks: u32,
        #[prost(uint32, tag = "5")]
        pub snapshot_interval_size: u32,
    }
}

// ---------------------------------------------------------------------------
// ab.proto
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BroadcastResponse {
    #[prost(enumeration = "super::common::Status", tag = "1")]
    pub status: i32,
    #[prost(string, tag = "2")]
    pub info: String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SeekNewest {}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SeekOldest {}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SeekSpecified {
    #[prost(uint64, tag = "1")]
    pub number: u64,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SeekPosition {
    #[prost(oneof = "seek_position::Type", tags = "1, 2, 3")]
    pub r#type: ::core::option::Option<seek_position::Type>,
}

pub mod seek_position {
    #[derive(Clone, Copy, PartialEq, ::prost::Oneof)]
    pub enum Type {
        #[prost(message, tag = "1")]
        Newest(super::SeekNewest),
        #[prost(message, tag = "2")]
        Oldest(super::SeekOldest),
        #[prost(message, tag = "3")]
        Specified(super::SeekSpecified),
    }
}

impl SeekPosition {
    pub fn newest() -> Self {
        Self {
            r#type: Some(seek_position::Type::Newest(SeekNewest {})),
        }
    }

    pub fn specified(number: u64) -> Self {
        Self {
            r#type: Some(seek_position::Type::Specified(SeekSpecified { number })),
        }
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SeekInfo {
    #[prost(message, optional, tag = "1")]
    pub start: ::core::option::Option<SeekPosition>,
    #[prost(message, optional, tag = "2")]
    pub stop: ::core::option::Option<SeekPosition>,
    #[prost(enumeration = "seek_info::SeekBehavior", tag = "3")]
    pub behavior: i32,
}

pub mod seek_info {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum SeekBehavior {
        BlockUntilReady = 0,
        FailIfNotReady = 1,
    }
}

impl SeekInfo {
    /// Request exactly one block at `position`, failing if it does not exist.
    pub fn single(position: SeekPosition) -> Self {
        Self {
            start: Some(position),
            stop: Some(position),
            behavior: seek_info::SeekBehavior::FailIfNotReady as i32,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeliverResponse {
    #[prost(oneof = "deliver_response::Type", tags = "1, 2")]
    pub r#type: ::core::option::Option<deliver_response::Type>,
}

pub mod deliver_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Type {
        #[prost(enumeration = "super::super::common::Status", tag = "1")]
        Status(i32),
        #[prost(message, tag = "2")]
        Block(super::Block),
    }
}
