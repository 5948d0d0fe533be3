//! PEM / X.509 helpers.
//!
//! Fabric stores certificates as PEM bytes inside MSP and raft configuration,
//! but older tooling wrote raw DER. Everything leaving this module is PEM.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use x509_parser::pem::parse_x509_pem;

use super::errors::CodecError;

const CERTIFICATE_LABEL: &str = "CERTIFICATE";
const CRL_LABEL: &str = "X509 CRL";

fn looks_like_pem(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|start| bytes[start..].starts_with(b"-----BEGIN"))
        .unwrap_or(false)
}

/// Wrap DER bytes in PEM armor with 64-column lines.
pub fn der_to_pem(label: &str, der: &[u8]) -> String {
    let body = STANDARD.encode(der);
    let mut pem = format!("-----BEGIN {label}-----\n");
    for chunk in body.as_bytes().chunks(64) {
        // base64 output is ASCII
        pem.push_str(&String::from_utf8_lossy(chunk));
        pem.push('\n');
    }
    pem.push_str(&format!("-----END {label}-----\n"));
    pem
}

/// Render certificate bytes from a config value as PEM text.
///
/// PEM input is returned unchanged once every block in it parses as a
/// certificate; anything else is treated as DER and wrapped.
pub fn certificate_bytes_to_pem(bytes: &[u8]) -> Result<String, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::InvalidCertificate("empty certificate".to_string()));
    }
    if looks_like_pem(bytes) {
        let pem = String::from_utf8(bytes.to_vec())
            .map_err(|e| CodecError::InvalidCertificate(e.to_string()))?;
        parse_certificate_pem(&pem)?;
        return Ok(pem);
    }
    Ok(der_to_pem(CERTIFICATE_LABEL, bytes))
}

/// Parse one PEM certificate block from the front of `input`, returning the
/// unread remainder and the block's DER encoding.
fn certificate_block(input: &[u8]) -> Result<(&[u8], Vec<u8>), CodecError> {
    let (rest, block) = parse_x509_pem(input)
        .map_err(|e| CodecError::InvalidCertificate(format!("bad PEM armor: {e}")))?;
    if block.label != CERTIFICATE_LABEL {
        return Err(CodecError::InvalidCertificate(format!(
            "expected {CERTIFICATE_LABEL} block, found {}",
            block.label
        )));
    }
    block
        .parse_x509()
        .map_err(|e| CodecError::InvalidCertificate(format!("bad X.509 body: {e}")))?;
    Ok((rest, block.contents))
}

/// Parse PEM certificate text fully and return the DER encoding of its first
/// certificate.
///
/// Chains are accepted, but every block must be a valid certificate and
/// nothing other than whitespace may follow the last one.
pub fn parse_certificate_pem(pem: &str) -> Result<Vec<u8>, CodecError> {
    if !looks_like_pem(pem.as_bytes()) {
        return Err(CodecError::InvalidCertificate("missing PEM armor".to_string()));
    }
    let (mut rest, first) = certificate_block(pem.as_bytes())?;
    while !rest.iter().all(u8::is_ascii_whitespace) {
        if !looks_like_pem(rest) {
            return Err(CodecError::InvalidCertificate(
                "unexpected data after certificate".to_string(),
            ));
        }
        rest = certificate_block(rest)?.0;
    }
    Ok(first)
}

/// Parse a PEM certificate revocation list and return its DER encoding.
pub fn parse_crl_pem(pem: &str) -> Result<Vec<u8>, CodecError> {
    let (_, block) = parse_x509_pem(pem.as_bytes())
        .map_err(|e| CodecError::InvalidCertificate(format!("bad PEM armor: {e}")))?;
    if block.label != CRL_LABEL {
        return Err(CodecError::InvalidCertificate(format!(
            "expected {CRL_LABEL} block, found {}",
            block.label
        )));
    }
    x509_parser::parse_x509_crl(&block.contents)
        .map_err(|e| CodecError::InvalidCertificate(format!("bad CRL body: {e}")))?;
    Ok(block.contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn self_signed_pem() -> String {
        rcgen::generate_simple_self_signed(vec!["orderer0.example.com".to_string()])
            .unwrap()
            .cert
            .pem()
    }

    #[test]
    fn test_pem_kept_as_is() {
        let pem = self_signed_pem();
        assert_eq!(certificate_bytes_to_pem(pem.as_bytes()).unwrap(), pem);
    }

    #[test]
    fn test_der_wrapped() {
        let pem = self_signed_pem();
        let der = parse_certificate_pem(&pem).unwrap();
        let rendered = certificate_bytes_to_pem(&der).unwrap();
        assert!(rendered.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert_eq!(parse_certificate_pem(&rendered).unwrap(), der);
    }

    #[test]
    fn test_garbage_pem_rejected() {
        let bogus = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        assert!(matches!(
            parse_certificate_pem(bogus),
            Err(CodecError::InvalidCertificate(_))
        ));
        assert!(parse_certificate_pem("not a pem").is_err());
    }

    #[test]
    fn test_trailing_junk_after_certificate_rejected() {
        let pem = self_signed_pem();
        let with_junk = format!("{pem}this is not a certificate\n");
        assert!(matches!(
            parse_certificate_pem(&with_junk),
            Err(CodecError::InvalidCertificate(m)) if m.contains("unexpected data")
        ));
        assert!(certificate_bytes_to_pem(with_junk.as_bytes()).is_err());

        let bogus = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        let broken_second = format!("{pem}{bogus}");
        assert!(parse_certificate_pem(&broken_second).is_err());
    }

    #[test]
    fn test_chain_yields_first_certificate() {
        let first = self_signed_pem();
        let chain = format!("{first}\n{}", self_signed_pem());
        assert_eq!(
            parse_certificate_pem(&chain).unwrap(),
            parse_certificate_pem(&first).unwrap()
        );
    }

    #[test]
    fn test_empty_certificate_rejected() {
        assert!(certificate_bytes_to_pem(&[]).is_err());
    }
}
