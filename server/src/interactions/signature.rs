//! Ed25519 Request Verification
//!
//! The platform signs `timestamp || body` with the application's key pair
//! and sends the signature and timestamp as headers. Verification fails
//! closed: any missing or malformed input is treated as a forgery.

use ring::signature::{UnparsedPublicKey, ED25519};
use thiserror::Error;

/// Header carrying the hex-encoded Ed25519 signature.
pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";

/// Header carrying the timestamp that was signed together with the body.
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

/// Ed25519 public key length in bytes.
const PUBLIC_KEY_LEN: usize = 32;

/// Ed25519 signature length in bytes.
const SIGNATURE_LEN: usize = 64;

/// Errors raised while loading the public key.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("Public key is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("Public key must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Verifies inbound interaction signatures against the application key.
#[derive(Debug, Clone)]
pub struct InteractionVerifier {
    public_key: [u8; PUBLIC_KEY_LEN],
}

impl InteractionVerifier {
    /// Load the hex-encoded key shown in the application's settings.
    pub fn from_hex(public_key: &str) -> Result<Self, SignatureError> {
        let bytes = hex::decode(public_key.trim())?;
        let public_key: [u8; PUBLIC_KEY_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| SignatureError::InvalidLength(bytes.len()))?;
        Ok(Self { public_key })
    }

    pub const fn from_bytes(public_key: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self { public_key }
    }

    /// Whether `signature` is a valid signature of `timestamp || body`.
    pub fn verify(&self, signature: Option<&str>, timestamp: Option<&str>, body: &[u8]) -> bool {
        let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
            return false;
        };

        let Ok(signature) = hex::decode(signature) else {
            return false;
        };
        if signature.len() != SIGNATURE_LEN {
            return false;
        }

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        UnparsedPublicKey::new(&ED25519, &self.public_key)
            .verify(&message, &signature)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring::signature::{Ed25519KeyPair, KeyPair};

    const BODY: &[u8] = br#"{"type":1}"#;
    const TIMESTAMP: &str = "1700000000";

    fn keypair() -> Ed25519KeyPair {
        Ed25519KeyPair::from_seed_unchecked(&[7u8; 32]).unwrap()
    }

    fn verifier(pair: &Ed25519KeyPair) -> InteractionVerifier {
        InteractionVerifier::from_hex(&hex::encode(pair.public_key().as_ref())).unwrap()
    }

    fn sign(pair: &Ed25519KeyPair, timestamp: &str, body: &[u8]) -> String {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        hex::encode(pair.sign(&message).as_ref())
    }

    #[test]
    fn accepts_valid_signature() {
        let pair = keypair();
        let sig = sign(&pair, TIMESTAMP, BODY);
        assert!(verifier(&pair).verify(Some(&sig), Some(TIMESTAMP), BODY));
    }

    #[test]
    fn rejects_flipped_body_byte() {
        let pair = keypair();
        let sig = sign(&pair, TIMESTAMP, BODY);
        let mut forged = BODY.to_vec();
        forged[3] ^= 0x01;
        assert!(!verifier(&pair).verify(Some(&sig), Some(TIMESTAMP), &forged));
    }

    #[test]
    fn rejects_other_timestamp() {
        let pair = keypair();
        let sig = sign(&pair, TIMESTAMP, BODY);
        assert!(!verifier(&pair).verify(Some(&sig), Some("1700000001"), BODY));
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        let pair = keypair();
        let v = verifier(&pair);
        let sig = sign(&pair, TIMESTAMP, BODY);
        assert!(!v.verify(None, Some(TIMESTAMP), BODY));
        assert!(!v.verify(Some(&sig), None, BODY));
        assert!(!v.verify(Some("zz-not-hex"), Some(TIMESTAMP), BODY));
        assert!(!v.verify(Some(&sig[..64]), Some(TIMESTAMP), BODY));
    }

    #[test]
    fn rejects_bad_public_keys() {
        assert!(matches!(
            InteractionVerifier::from_hex("nothex"),
            Err(SignatureError::InvalidHex(_))
        ));
        assert!(matches!(
            InteractionVerifier::from_hex("abcd"),
            Err(SignatureError::InvalidLength(2))
        ));
    }
}
