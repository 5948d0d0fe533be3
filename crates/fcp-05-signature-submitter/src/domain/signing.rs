//! Config signatures, envelope signing and signed Deliver seek requests.

use chrono::Utc;
use fcp_01_block_codec::proto::common::{
    ChannelHeader, ConfigSignature, Envelope, Header, HeaderType, Payload,
};
use fcp_01_block_codec::proto::orderer::SeekInfo;
use fcp_04_config_proposer::open_config_update_envelope;
use prost::Message;

use super::errors::SubmitterError;
use super::identity::SigningIdentity;

/// `ConfigSignature` over `signature_header || config_update`.
pub fn create_config_signature(
    identity: &SigningIdentity,
    config_update: &[u8],
) -> ConfigSignature {
    let signature_header = identity.new_signature_header().encode_to_vec();
    let mut message = Vec::with_capacity(signature_header.len() + config_update.len());
    message.extend_from_slice(&signature_header);
    message.extend_from_slice(config_update);
    ConfigSignature {
        signature: identity.sign(&message),
        signature_header,
    }
}

/// Append `identity`'s config signature to a marshaled CONFIG_UPDATE
/// envelope. The outer envelope is left unsigned.
pub fn add_config_signature(
    envelope: &[u8],
    identity: &SigningIdentity,
) -> Result<Vec<u8>, SubmitterError> {
    let opened = open_config_update_envelope(envelope)
        .map_err(|e| SubmitterError::InvalidEnvelope(e.to_string()))?;
    let mut update_envelope = opened.update_envelope;
    let signature = create_config_signature(identity, &update_envelope.config_update);
    update_envelope.signatures.push(signature);

    let mut payload = opened.payload;
    payload.data = update_envelope.encode_to_vec();
    Ok(Envelope {
        payload: payload.encode_to_vec(),
        signature: Vec::new(),
    }
    .encode_to_vec())
}

/// Set the payload's signature header to `identity` and sign the payload.
pub fn sign_envelope(
    envelope: &[u8],
    identity: &SigningIdentity,
) -> Result<Envelope, SubmitterError> {
    let envelope =
        Envelope::decode(envelope).map_err(|e| SubmitterError::InvalidEnvelope(e.to_string()))?;
    let mut payload = Payload::decode(envelope.payload.as_slice())
        .map_err(|e| SubmitterError::InvalidEnvelope(e.to_string()))?;
    let header = payload
        .header
        .as_mut()
        .ok_or_else(|| SubmitterError::InvalidEnvelope("payload header is missing".to_string()))?;
    header.signature_header = identity.new_signature_header().encode_to_vec();

    let payload = payload.encode_to_vec();
    Ok(Envelope {
        signature: identity.sign(&payload),
        payload,
    })
}

/// Signed DELIVER_SEEK_INFO envelope for `channel`.
pub fn seek_envelope(channel: &str, seek: &SeekInfo, identity: &SigningIdentity) -> Envelope {
    let now = Utc::now();
    let channel_header = ChannelHeader {
        r#type: HeaderType::DeliverSeekInfo as i32,
        version: 0,
        timestamp: Some(prost_types::Timestamp {
            seconds: now.timestamp(),
            nanos: now.timestamp_subsec_nanos() as i32,
        }),
        channel_id: channel.to_string(),
        tx_id: String::new(),
        epoch: 0,
        extension: Vec::new(),
        tls_cert_hash: Vec::new(),
    };
    let payload = Payload {
        header: Some(Header {
            channel_header: channel_header.encode_to_vec(),
            signature_header: identity.new_signature_header().encode_to_vec(),
        }),
        data: seek.encode_to_vec(),
    }
    .encode_to_vec();
    Envelope {
        signature: identity.sign(&payload),
        payload,
    }
}
