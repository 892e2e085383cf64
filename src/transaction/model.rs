use serde::{Deserialize, Serialize};

use crate::hash::apply_sha256;

/// A transfer of virtual coins between two identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        }
    }

    /// SHA-256 over `sender:receiver:amount`.
    pub fn compute_hash(&self) -> String {
        apply_sha256(&format!("{}:{}:{}", self.sender, self.receiver, self.amount))
    }

    /// Human readable form carried in the signed message text.
    pub fn describe(&self) -> String {
        format!("{} send {} VC to {}", self.sender, self.amount, self.receiver)
    }
}
