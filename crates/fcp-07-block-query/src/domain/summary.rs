//! Decoded views of ledger blocks and the transactions inside them.

use chrono::{DateTime, Utc};
use fcp_01_block_codec::proto::common::{Block, BlockHeader, BlockMetadataIndex, HeaderType};
use fcp_01_block_codec::proto::msp::SerializedIdentity;
use fcp_01_block_codec::{
    envelope_at, unmarshal_channel_header, unmarshal_payload, unmarshal_signature_header,
    CodecError, Message,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub tx_id: String,
    pub channel_id: String,
    /// `ENDORSER_TRANSACTION`, `CONFIG`, ...
    pub header_type: String,
    pub creator_msp_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Committer verdict from the block's transaction filter.
    pub validation_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub number: u64,
    pub data_hash: String,
    pub previous_hash: String,
    pub transaction_count: usize,
    pub transactions: Vec<TransactionSummary>,
}

/// `height` plus the hashes of the newest block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub height: u64,
    pub current_block_hash: String,
    pub previous_block_hash: String,
}

fn validation_code_name(code: u8) -> String {
    match code {
        0 => "VALID".to_string(),
        1 => "NIL_ENVELOPE".to_string(),
        2 => "BAD_PAYLOAD".to_string(),
        3 => "BAD_COMMON_HEADER".to_string(),
        4 => "BAD_CREATOR_SIGNATURE".to_string(),
        8 => "BAD_CHANNEL_HEADER".to_string(),
        9 => "BAD_RESPONSE_PAYLOAD".to_string(),
        10 => "BAD_RWSET".to_string(),
        11 => "MVCC_READ_CONFLICT".to_string(),
        12 => "PHANTOM_READ_CONFLICT".to_string(),
        13 => "UNKNOWN_TX_TYPE".to_string(),
        14 => "TARGET_CHAIN_NOT_FOUND".to_string(),
        15 => "MARSHAL_TX_ERROR".to_string(),
        16 => "NIL_TXACTION".to_string(),
        17 => "EXPIRED_CHAINCODE".to_string(),
        18 => "CHAINCODE_VERSION_CONFLICT".to_string(),
        19 => "BAD_HEADER_EXTENSION".to_string(),
        20 => "BAD_CHANNEL_HEADER_EXTENSION".to_string(),
        21 => "BAD_PROPOSAL_TXID".to_string(),
        22 => "DUPLICATE_TXID".to_string(),
        23 => "ENDORSEMENT_POLICY_FAILURE".to_string(),
        254 => "NOT_VALIDATED".to_string(),
        255 => "INVALID_OTHER_REASON".to_string(),
        other => format!("CODE_{other}"),
    }
}

fn transaction_filter(block: &Block) -> &[u8] {
    block
        .metadata
        .as_ref()
        .and_then(|m| m.metadata.get(BlockMetadataIndex::TransactionsFilter as usize))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn envelope_count(block: &Block) -> usize {
    block.data.as_ref().map_or(0, |d| d.data.len())
}

/// Decode the transaction at `index`.
pub fn transaction_at(block: &Block, index: usize) -> Result<TransactionSummary, CodecError> {
    let envelope = envelope_at(block, index)?;
    let payload = unmarshal_payload(&envelope)?;
    let channel_header = unmarshal_channel_header(&payload)?;
    let signature_header = unmarshal_signature_header(&payload)?;

    let creator_msp_id = SerializedIdentity::decode(signature_header.creator.as_slice())
        .ok()
        .map(|identity| identity.mspid)
        .filter(|msp_id| !msp_id.is_empty());
    let timestamp = channel_header
        .timestamp
        .as_ref()
        .and_then(|ts| DateTime::from_timestamp(ts.seconds, ts.nanos.max(0) as u32));
    let header_type = HeaderType::try_from(channel_header.r#type)
        .map(|t| t.as_str_name().to_string())
        .unwrap_or_else(|_| format!("TYPE_{}", channel_header.r#type));
    // Blocks straight from the orderer carry no filter: not yet validated.
    let validation_code = transaction_filter(block)
        .get(index)
        .map_or_else(|| validation_code_name(254), |code| validation_code_name(*code));

    Ok(TransactionSummary {
        tx_id: channel_header.tx_id,
        channel_id: channel_header.channel_id,
        header_type,
        creator_msp_id,
        timestamp,
        validation_code,
    })
}

pub fn block_transactions(block: &Block) -> Result<Vec<TransactionSummary>, CodecError> {
    (0..envelope_count(block))
        .map(|index| transaction_at(block, index))
        .collect()
}

/// Index of the envelope whose channel header carries `tx_id`.
pub fn find_transaction(block: &Block, tx_id: &str) -> Result<Option<usize>, CodecError> {
    for index in 0..envelope_count(block) {
        let payload = unmarshal_payload(&envelope_at(block, index)?)?;
        if unmarshal_channel_header(&payload)?.tx_id == tx_id {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

pub fn summarize_block(block: &Block) -> Result<BlockSummary, CodecError> {
    let header = block
        .header
        .as_ref()
        .ok_or_else(|| CodecError::InvalidBlock("block header is missing".to_string()))?;
    let transactions = block_transactions(block)?;
    Ok(BlockSummary {
        number: header.number,
        data_hash: hex::encode(&header.data_hash),
        previous_hash: hex::encode(&header.previous_hash),
        transaction_count: transactions.len(),
        transactions,
    })
}

// ---------------------------------------------------------------------------
// Header hashing
// ---------------------------------------------------------------------------

fn der_length(len: usize, out: &mut Vec<u8>) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

fn der_element(tag: u8, content: &[u8], out: &mut Vec<u8>) {
    out.push(tag);
    der_length(content.len(), out);
    out.extend_from_slice(content);
}

fn der_unsigned(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count().min(7);
    let mut content = Vec::with_capacity(9);
    if bytes[skip] & 0x80 != 0 {
        content.push(0);
    }
    content.extend_from_slice(&bytes[skip..]);
    content
}

/// `SEQUENCE { INTEGER number, OCTET STRING previous_hash, OCTET STRING data_hash }`
pub fn header_der(header: &BlockHeader) -> Vec<u8> {
    let mut body = Vec::new();
    der_element(0x02, &der_unsigned(header.number), &mut body);
    der_element(0x04, &header.previous_hash, &mut body);
    der_element(0x04, &header.data_hash, &mut body);
    let mut out = Vec::with_capacity(body.len() + 4);
    der_element(0x30, &body, &mut out);
    out
}

/// Block hash as Fabric computes it: SHA-256 over the DER header.
pub fn header_hash(header: &BlockHeader) -> Vec<u8> {
    Sha256::digest(header_der(header)).to_vec()
}

pub fn chain_info(height: u64, newest: &Block) -> Result<ChainInfo, CodecError> {
    let header = newest
        .header
        .as_ref()
        .ok_or_else(|| CodecError::InvalidBlock("block header is missing".to_string()))?;
    Ok(ChainInfo {
        height,
        current_block_hash: hex::encode(header_hash(header)),
        previous_block_hash: hex::encode(&header.previous_hash),
    })
}
