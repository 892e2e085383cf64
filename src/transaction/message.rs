use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::Transaction;
use crate::error::CryptoError;
use crate::wallet::{KeyPair, verify_signature_hex};

/// A signed envelope submitted to the mempool and carried in blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Ledger-issued, strictly increasing.
    pub id: u64,
    /// Hex compressed public key of the signer.
    pub public_key: String,
    pub transaction: Option<Transaction>,
    /// Hex compact ECDSA signature over [`Message::data`].
    pub signature: String,
}

impl Message {
    /// An unsigned message without a transaction.
    pub fn new(id: u64, public_key: impl Into<String>) -> Self {
        Self {
            id,
            public_key: public_key.into(),
            transaction: None,
            signature: String::new(),
        }
    }

    /// Build a message carrying `transaction` and sign it with `keys`.
    pub fn signed(id: u64, transaction: Transaction, keys: &KeyPair) -> Self {
        let mut message = Self::new(id, keys.public_key_hex());
        message.transaction = Some(transaction);
        message.sign(keys);
        message
    }

    pub fn sign(&mut self, keys: &KeyPair) {
        self.signature = keys.sign(&self.data());
    }

    pub fn text(&self) -> String {
        self.transaction
            .as_ref()
            .map(Transaction::describe)
            .unwrap_or_default()
    }

    /// Signed payload: id, derived text and the transaction hash.
    pub fn data(&self) -> Vec<u8> {
        match &self.transaction {
            Some(tx) => format!("{}{}{}", self.id, self.text(), tx.compute_hash()).into_bytes(),
            None => self.id.to_string().into_bytes(),
        }
    }

    pub fn is_signature_valid(&self) -> Result<bool, CryptoError> {
        verify_signature_hex(&self.public_key, &self.signature, &self.data())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID: {} : {}", self.id, self.text())
    }
}
