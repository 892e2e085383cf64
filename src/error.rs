use thiserror::Error;

/// Failures of the signing/verification primitives.
///
/// These mean the key material or encoding is broken, not that a signature
/// simply failed to verify; callers abort the enclosing operation.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid hex encoding: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid public key: {0}")]
    PublicKey(#[source] secp256k1::Error),

    #[error("invalid signature encoding: {0}")]
    Signature(#[source] secp256k1::Error),

    #[error("message has no signer public key")]
    MissingPublicKey,
}
