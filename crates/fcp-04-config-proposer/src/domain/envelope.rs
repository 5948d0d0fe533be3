//! CONFIG_UPDATE envelope layout:
//!
//! ```text
//! Envelope{payload, signature=∅}
//!   └── Payload{header{ChannelHeader(CONFIG_UPDATE), SignatureHeader=∅}, data}
//!         └── ConfigUpdateEnvelope{config_update, signatures=[]}
//! ```
//!
//! The signature header, envelope signature and config signatures are left
//! empty for the signature collector.

use chrono::{DateTime, Utc};
use fcp_01_block_codec::proto::common::{
    ChannelHeader, ConfigUpdate, ConfigUpdateEnvelope, Envelope, Header, HeaderType, Payload,
};
use fcp_01_block_codec::{unmarshal_channel_header, unmarshal_payload};
use prost::Message;

use super::errors::ProposerError;

pub(crate) fn timestamp(at: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos() as i32,
    }
}

/// Wrap a marshaled `ConfigUpdate` for `channel_id`.
pub fn config_update_envelope(
    channel_id: &str,
    config_update: Vec<u8>,
    created_at: DateTime<Utc>,
) -> Envelope {
    let channel_header = ChannelHeader {
        r#type: HeaderType::ConfigUpdate as i32,
        version: 0,
        timestamp: Some(timestamp(created_at)),
        channel_id: channel_id.to_string(),
        tx_id: String::new(),
        epoch: 0,
        extension: Vec::new(),
        tls_cert_hash: Vec::new(),
    };
    let data = ConfigUpdateEnvelope {
        config_update,
        signatures: Vec::new(),
    };
    let payload = Payload {
        header: Some(Header {
            channel_header: channel_header.encode_to_vec(),
            signature_header: Vec::new(),
        }),
        data: data.encode_to_vec(),
    };
    Envelope {
        payload: payload.encode_to_vec(),
        signature: Vec::new(),
    }
}

/// Decoded layers of a CONFIG_UPDATE envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedEnvelope {
    pub payload: Payload,
    pub channel_header: ChannelHeader,
    pub update_envelope: ConfigUpdateEnvelope,
    pub config_update: ConfigUpdate,
}

fn invalid(e: impl std::fmt::Display) -> ProposerError {
    ProposerError::InvalidEnvelope(e.to_string())
}

/// Decode a marshaled CONFIG_UPDATE envelope down to its `ConfigUpdate`.
pub fn open_config_update_envelope(bytes: &[u8]) -> Result<OpenedEnvelope, ProposerError> {
    let envelope = Envelope::decode(bytes).map_err(invalid)?;
    let payload = unmarshal_payload(&envelope).map_err(invalid)?;
    let channel_header = unmarshal_channel_header(&payload).map_err(invalid)?;
    if channel_header.r#type != HeaderType::ConfigUpdate as i32 {
        return Err(invalid(format!(
            "header type {} is not CONFIG_UPDATE",
            channel_header.r#type
        )));
    }
    let update_envelope = ConfigUpdateEnvelope::decode(payload.data.as_slice()).map_err(invalid)?;
    let config_update =
        ConfigUpdate::decode(update_envelope.config_update.as_slice()).map_err(invalid)?;
    Ok(OpenedEnvelope {
        payload,
        channel_header,
        update_envelope,
        config_update,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_layers() {
        let update = ConfigUpdate {
            channel_id: "mychannel".into(),
            ..Default::default()
        };
        let env = config_update_envelope("mychannel", update.encode_to_vec(), Utc::now());
        assert!(env.signature.is_empty());

        let opened = open_config_update_envelope(&env.encode_to_vec()).unwrap();
        assert_eq!(opened.channel_header.channel_id, "mychannel");
        assert_eq!(opened.channel_header.epoch, 0);
        assert!(opened.payload.header.unwrap().signature_header.is_empty());
        assert!(opened.update_envelope.signatures.is_empty());
        assert_eq!(opened.config_update, update);
    }

    #[test]
    fn test_rejects_non_update_envelope() {
        assert!(open_config_update_envelope(b"\x0a\x02zz").is_err());
    }
}
