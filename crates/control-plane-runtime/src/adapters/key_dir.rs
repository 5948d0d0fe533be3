//! PEM key directory: `<key_id>.key.pem` holds the private key and
//! `<key_id>.cert.pem` the certificate. Files are read on every call so no
//! private key stays in memory beyond one signing operation.

use async_trait::async_trait;
use shared_types::{KeyId, KeyStore, KeyStoreError};
use std::io::ErrorKind;
use std::path::PathBuf;
use zeroize::Zeroizing;

pub struct PemDirKeyStore {
    dir: PathBuf,
}

impl PemDirKeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key_id: KeyId) -> PathBuf {
        self.dir.join(format!("{key_id}.key.pem"))
    }

    fn cert_path(&self, key_id: KeyId) -> PathBuf {
        self.dir.join(format!("{key_id}.cert.pem"))
    }
}

#[async_trait]
impl KeyStore for PemDirKeyStore {
    async fn private_key_pem(&self, key_id: KeyId) -> Result<Zeroizing<String>, KeyStoreError> {
        match tokio::fs::read_to_string(self.key_path(key_id)).await {
            Ok(pem) => Ok(Zeroizing::new(pem)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(KeyStoreError::KeyNotFound(key_id)),
            Err(e) => Err(KeyStoreError::Unavailable(e.to_string())),
        }
    }

    async fn certificate_pem(&self, key_id: KeyId) -> Result<String, KeyStoreError> {
        match tokio::fs::read_to_string(self.cert_path(key_id)).await {
            Ok(pem) => Ok(pem),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if tokio::fs::try_exists(self.key_path(key_id)).await.unwrap_or(false) {
                    Err(KeyStoreError::CertificateMissing(key_id))
                } else {
                    Err(KeyStoreError::KeyNotFound(key_id))
                }
            }
            Err(e) => Err(KeyStoreError::Unavailable(e.to_string())),
        }
    }
}
