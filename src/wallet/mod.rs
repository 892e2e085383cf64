use std::fmt;

use rand::rngs::OsRng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey, ecdsa::Signature};

use crate::error::CryptoError;
use crate::hash::sha256;

/// A secp256k1 key pair owned by one identity.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a fresh key pair from the OS RNG.
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret, public) = secp.generate_keypair(&mut OsRng);
        Self { secret, public }
    }

    /// Hex of the compressed (33 bytes) public key.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public.serialize())
    }

    /// Sign SHA-256(`payload`) and return the compact signature as hex.
    pub fn sign(&self, payload: &[u8]) -> String {
        let secp = Secp256k1::signing_only();
        let msg = Message::from_digest(sha256(payload));
        let sig = secp.sign_ecdsa(&msg, &self.secret);
        hex::encode(sig.serialize_compact())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

/// Verify a hex compact signature over SHA-256(`payload`) against a hex
/// compressed public key.
///
/// `Ok(false)` is a signature that does not match; `Err` is key or signature
/// material that cannot even be decoded.
pub fn verify_signature_hex(
    pubkey_hex: &str,
    sig_hex: &str,
    payload: &[u8],
) -> Result<bool, CryptoError> {
    if pubkey_hex.is_empty() {
        return Err(CryptoError::MissingPublicKey);
    }
    let secp = Secp256k1::verification_only();

    let pk_bytes = hex::decode(pubkey_hex)?;
    let pk = PublicKey::from_slice(&pk_bytes).map_err(CryptoError::PublicKey)?;

    let sig_bytes = hex::decode(sig_hex)?;
    let sig = Signature::from_compact(&sig_bytes).map_err(CryptoError::Signature)?;

    let msg = Message::from_digest(sha256(payload));
    Ok(secp.verify_ecdsa(&msg, &sig, &pk).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_round_trips() {
        let keys = KeyPair::generate();
        let sig = keys.sign(b"1miner0 send 10 VC to miner1");
        let payload = b"1miner0 send 10 VC to miner1";
        assert!(verify_signature_hex(&keys.public_key_hex(), &sig, payload).unwrap());
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let keys = KeyPair::generate();
        let sig = keys.sign(b"payload");
        assert!(!verify_signature_hex(&keys.public_key_hex(), &sig, b"payloaD").unwrap());
    }

    #[test]
    fn other_key_fails_verification() {
        let keys = KeyPair::generate();
        let other = KeyPair::generate();
        let sig = keys.sign(b"payload");
        assert!(!verify_signature_hex(&other.public_key_hex(), &sig, b"payload").unwrap());
    }

    #[test]
    fn generated_keys_are_unique() {
        assert_ne!(KeyPair::generate().public_key_hex(), KeyPair::generate().public_key_hex());
    }

    #[test]
    fn malformed_material_is_an_error() {
        let keys = KeyPair::generate();
        let sig = keys.sign(b"payload");

        assert!(matches!(
            verify_signature_hex("zz", &sig, b"payload"),
            Err(CryptoError::Hex(_))
        ));
        assert!(matches!(
            verify_signature_hex("02abcd", &sig, b"payload"),
            Err(CryptoError::PublicKey(_))
        ));
        assert!(matches!(
            verify_signature_hex(&keys.public_key_hex(), "0101", b"payload"),
            Err(CryptoError::Signature(_))
        ));
        assert!(matches!(
            verify_signature_hex("", &sig, b"payload"),
            Err(CryptoError::MissingPublicKey)
        ));
    }
}
