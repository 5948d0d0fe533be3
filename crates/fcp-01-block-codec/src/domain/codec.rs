//! # Block Codec
//!
//! The single place that base64-decodes stored blocks and unwraps the
//! protobuf layers `Block → Envelope → Payload → ConfigEnvelope → Config`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use prost::Message;

use super::errors::CodecError;
use crate::proto::common::{
    Block, BlockMetadataIndex, ChannelHeader, Config, ConfigEnvelope, Envelope, HeaderType,
    LastConfig, Metadata, OrdererBlockMetadata, Payload, SignatureHeader,
};

/// Decode a stored base64 block into raw protobuf bytes.
pub fn block_bytes_from_b64(block_b64: &str) -> Result<Vec<u8>, CodecError> {
    Ok(STANDARD.decode(block_b64.trim())?)
}

/// Encode raw block bytes for storage.
pub fn block_bytes_to_b64(block_bytes: &[u8]) -> String {
    STANDARD.encode(block_bytes)
}

pub fn decode_block(block_bytes: &[u8]) -> Result<Block, CodecError> {
    Block::decode(block_bytes).map_err(|e| CodecError::decode("block", e))
}

pub fn decode_block_b64(block_b64: &str) -> Result<Block, CodecError> {
    decode_block(&block_bytes_from_b64(block_b64)?)
}

pub fn encode_block(block: &Block) -> Vec<u8> {
    block.encode_to_vec()
}

/// Block number, or an error when the header is missing.
pub fn block_number(block: &Block) -> Result<u64, CodecError> {
    block
        .header
        .as_ref()
        .map(|h| h.number)
        .ok_or_else(|| CodecError::InvalidBlock("block header is missing".to_string()))
}

/// Envelope at `index` of the block data.
pub fn envelope_at(block: &Block, index: usize) -> Result<Envelope, CodecError> {
    let data = block
        .data
        .as_ref()
        .ok_or_else(|| CodecError::InvalidBlock("block data is missing".to_string()))?;
    let raw = data.data.get(index).ok_or_else(|| {
        CodecError::InvalidBlock(format!(
            "block has {} envelopes, index {} requested",
            data.data.len(),
            index
        ))
    })?;
    Envelope::decode(raw.as_slice()).map_err(|e| CodecError::decode("envelope", e))
}

pub fn unmarshal_payload(envelope: &Envelope) -> Result<Payload, CodecError> {
    Payload::decode(envelope.payload.as_slice()).map_err(|e| CodecError::decode("payload", e))
}

pub fn unmarshal_channel_header(payload: &Payload) -> Result<ChannelHeader, CodecError> {
    let header = payload
        .header
        .as_ref()
        .ok_or_else(|| CodecError::InvalidBlock("payload header is missing".to_string()))?;
    ChannelHeader::decode(header.channel_header.as_slice())
        .map_err(|e| CodecError::decode("channel header", e))
}

pub fn unmarshal_signature_header(payload: &Payload) -> Result<SignatureHeader, CodecError> {
    let header = payload
        .header
        .as_ref()
        .ok_or_else(|| CodecError::InvalidBlock("payload header is missing".to_string()))?;
    SignatureHeader::decode(header.signature_header.as_slice())
        .map_err(|e| CodecError::decode("signature header", e))
}

/// Unwrap the `ConfigEnvelope` carried by a configuration block.
pub fn extract_config_envelope(block: &Block) -> Result<ConfigEnvelope, CodecError> {
    let envelope = envelope_at(block, 0)?;
    let payload = unmarshal_payload(&envelope)?;
    let channel_header = unmarshal_channel_header(&payload)?;
    if channel_header.r#type != HeaderType::Config as i32 {
        return Err(CodecError::NotConfigBlock {
            number: block.header.as_ref().map(|h| h.number).unwrap_or_default(),
            header_type: channel_header.r#type,
        });
    }
    ConfigEnvelope::decode(payload.data.as_slice())
        .map_err(|e| CodecError::decode("config envelope", e))
}

/// `ExtractConfigFromBlock`: the channel `Config` held by a config block.
pub fn extract_config_from_block(block: &Block) -> Result<Config, CodecError> {
    extract_config_envelope(block)?
        .config
        .ok_or_else(|| CodecError::InvalidBlock("config envelope has no config".to_string()))
}

pub fn config_from_block_bytes(block_bytes: &[u8]) -> Result<Config, CodecError> {
    extract_config_from_block(&decode_block(block_bytes)?)
}

/// Channel ID recorded in the first envelope of the block.
pub fn channel_id_from_block(block: &Block) -> Result<String, CodecError> {
    let payload = unmarshal_payload(&envelope_at(block, 0)?)?;
    Ok(unmarshal_channel_header(&payload)?.channel_id)
}

/// Index of the last configuration block as recorded in `block`'s metadata.
///
/// Reads the orderer block metadata stored under the SIGNATURES slot first
/// and falls back to the legacy LAST_CONFIG slot.
pub fn last_config_index(block: &Block) -> Result<u64, CodecError> {
    let metadata = block
        .metadata
        .as_ref()
        .ok_or_else(|| CodecError::InvalidBlock("block metadata is missing".to_string()))?;

    if let Some(raw) = metadata
        .metadata
        .get(BlockMetadataIndex::Signatures as usize)
        .filter(|raw| !raw.is_empty())
    {
        let md = Metadata::decode(raw.as_slice())
            .map_err(|e| CodecError::decode("signatures metadata", e))?;
        if !md.value.is_empty() {
            let orderer_md = OrdererBlockMetadata::decode(md.value.as_slice())
                .map_err(|e| CodecError::decode("orderer block metadata", e))?;
            if let Some(last_config) = orderer_md.last_config {
                return Ok(last_config.index);
            }
        }
    }

    let raw = metadata
        .metadata
        .get(BlockMetadataIndex::LastConfig as usize)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| {
            CodecError::InvalidBlock("block metadata carries no last config index".to_string())
        })?;
    let md = Metadata::decode(raw.as_slice())
        .map_err(|e| CodecError::decode("last config metadata", e))?;
    let last_config = LastConfig::decode(md.value.as_slice())
        .map_err(|e| CodecError::decode("last config", e))?;
    Ok(last_config.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::common::{BlockData, BlockHeader, BlockMetadata, Header};

    fn envelope_block(header_type: HeaderType, data: Vec<u8>) -> Block {
        let channel_header = ChannelHeader {
            r#type: header_type as i32,
            channel_id: "mychannel".to_string(),
            ..Default::default()
        };
        let payload = Payload {
            header: Some(Header {
                channel_header: channel_header.encode_to_vec(),
                signature_header: Vec::new(),
            }),
            data,
        };
        let envelope = Envelope {
            payload: payload.encode_to_vec(),
            signature: Vec::new(),
        };
        Block {
            header: Some(BlockHeader {
                number: 3,
                ..Default::default()
            }),
            data: Some(BlockData {
                data: vec![envelope.encode_to_vec()],
            }),
            metadata: None,
        }
    }

    #[test]
    fn test_extract_config_requires_data() {
        let block = Block::default();
        let err = extract_config_from_block(&block).unwrap_err();
        assert!(matches!(err, CodecError::InvalidBlock(_)));

        let empty = Block {
            data: Some(BlockData { data: vec![] }),
            ..Default::default()
        };
        assert!(matches!(
            extract_config_from_block(&empty),
            Err(CodecError::InvalidBlock(_))
        ));
    }

    #[test]
    fn test_extract_config_round_trip() {
        let config = Config {
            sequence: 4,
            channel_group: None,
        };
        let envelope = ConfigEnvelope {
            config: Some(config.clone()),
            last_update: None,
        };
        let block = envelope_block(HeaderType::Config, envelope.encode_to_vec());
        let bytes = encode_block(&block);

        let decoded = config_from_block_bytes(&bytes).unwrap();
        assert_eq!(decoded, config);
        assert_eq!(channel_id_from_block(&block).unwrap(), "mychannel");
    }

    #[test]
    fn test_non_config_block_rejected() {
        let block = envelope_block(HeaderType::EndorserTransaction, vec![]);
        assert!(matches!(
            extract_config_from_block(&block),
            Err(CodecError::NotConfigBlock { number: 3, .. })
        ));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = decode_block(&[0xff, 0xff, 0xff]).unwrap_err();
        assert_eq!(
            shared_types::ClassifiedError::code(&err),
            "invalid_block"
        );
    }

    #[test]
    fn test_base64_round_trip() {
        let block = envelope_block(HeaderType::Config, vec![]);
        let b64 = block_bytes_to_b64(&encode_block(&block));
        assert_eq!(decode_block_b64(&b64).unwrap(), block);
        assert!(matches!(
            block_bytes_from_b64("not base64!"),
            Err(CodecError::Base64(_))
        ));
    }

    #[test]
    fn test_last_config_index_prefers_orderer_metadata() {
        let orderer_md = OrdererBlockMetadata {
            last_config: Some(LastConfig { index: 9 }),
            consenter_metadata: vec![],
        };
        let legacy = Metadata {
            value: LastConfig { index: 2 }.encode_to_vec(),
            signatures: vec![],
        };
        let mut block = envelope_block(HeaderType::EndorserTransaction, vec![]);
        block.metadata = Some(BlockMetadata {
            metadata: vec![
                Metadata {
                    value: orderer_md.encode_to_vec(),
                    signatures: vec![],
                }
                .encode_to_vec(),
                legacy.encode_to_vec(),
            ],
        });
        assert_eq!(last_config_index(&block).unwrap(), 9);

        block.metadata = Some(BlockMetadata {
            metadata: vec![Vec::new(), legacy.encode_to_vec()],
        });
        assert_eq!(last_config_index(&block).unwrap(), 2);
    }
}
