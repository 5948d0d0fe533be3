//! # Signing Identity
//!
//! An organization admin's certificate and P-256 private key. Fabric expects
//! ECDSA over SHA-256, DER encoded, with a low-S value.

use fcp_01_block_codec::parse_certificate_pem;
use fcp_01_block_codec::proto::common::SignatureHeader;
use fcp_01_block_codec::proto::msp::SerializedIdentity;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use p256::pkcs8::DecodePrivateKey;
use prost::Message;
use rand::RngCore;
use zeroize::Zeroizing;

use super::errors::IdentityError;

/// Length of the random nonce in every signature header.
pub const NONCE_LEN: usize = 24;

/// `SigningKey` zeroizes its scalar on drop; the PEM it was parsed from is
/// held in `Zeroizing` by the caller.
pub struct SigningIdentity {
    msp_id: String,
    cert_pem: String,
    signing_key: SigningKey,
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("msp_id", &self.msp_id)
            .finish_non_exhaustive()
    }
}

impl SigningIdentity {
    /// Build from PEM material. The key must be PKCS#8 P-256.
    pub fn from_pem(
        msp_id: &str,
        cert_pem: &str,
        key_pem: &Zeroizing<String>,
    ) -> Result<Self, IdentityError> {
        parse_certificate_pem(cert_pem).map_err(IdentityError::InvalidCertificate)?;
        let signing_key = SigningKey::from_pkcs8_pem(key_pem.as_str())
            .map_err(|e| IdentityError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self {
            msp_id: msp_id.to_string(),
            cert_pem: cert_pem.to_string(),
            signing_key,
        })
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// Marshaled `SerializedIdentity` (MSP ID + PEM certificate).
    pub fn serialize(&self) -> Vec<u8> {
        SerializedIdentity {
            mspid: self.msp_id.clone(),
            id_bytes: self.cert_pem.as_bytes().to_vec(),
        }
        .encode_to_vec()
    }

    /// Signature header with this identity as creator and a fresh nonce.
    pub fn new_signature_header(&self) -> SignatureHeader {
        let mut nonce = vec![0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        SignatureHeader {
            creator: self.serialize(),
            nonce,
        }
    }

    /// DER encoded low-S ECDSA-SHA256 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let signature: Signature = self.signing_key.sign(message);
        let signature = signature.normalize_s().unwrap_or(signature);
        signature.to_der().as_bytes().to_vec()
    }
}
