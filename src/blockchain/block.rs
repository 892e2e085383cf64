use std::fmt;

use chrono::Utc;

use crate::hash::{apply_sha256, meets_difficulty, sha256_hex};
use crate::transaction::Message;

/// A block proposed by a miner.
///
/// Everything except the nonce is fixed at construction and folded into a
/// cached pre-image, so each proof-of-work trial hashes that prefix plus the
/// current nonce.
#[derive(Debug, Clone)]
pub struct Block {
    id: u64,
    timestamp: i64, // Unix millis (UTC)
    previous_hash: String,
    miner_id: String,
    messages: Vec<Message>,
    max_message_id_previous_block: u64,
    reward: i64,
    zeroes_in_hash: u32,
    nonce: u64,
    generate_secs: u64,
    difficulty_status: String,
    static_hash_data: String,
}

impl Block {
    pub fn new(
        id: u64,
        previous_hash: String,
        messages: Vec<Message>,
        miner_id: String,
        zeroes_in_hash: u32,
        max_message_id_previous_block: u64,
        reward: i64,
    ) -> Self {
        let timestamp = Utc::now().timestamp_millis();
        let static_hash_data = format!(
            "{}:{}:{}:{}:{}",
            id,
            timestamp,
            previous_hash,
            compute_messages_hash(&messages),
            max_message_id_previous_block
        );
        Self {
            id,
            timestamp,
            previous_hash,
            miner_id,
            messages,
            max_message_id_previous_block,
            reward,
            zeroes_in_hash,
            nonce: 0,
            generate_secs: 0,
            difficulty_status: String::new(),
            static_hash_data,
        }
    }

    /// Hash of the cached pre-image and the current nonce.
    pub fn compute_hash(&self) -> String {
        apply_sha256(&format!("{}:{}", self.static_hash_data, self.nonce))
    }

    /// Sequential nonce search until the hash has `zeroes` leading zeros.
    pub fn mine(&mut self, zeroes: u32) {
        while !meets_difficulty(&self.compute_hash(), zeroes) {
            self.nonce = self.nonce.wrapping_add(1);
        }
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    pub fn set_generate_secs(&mut self, secs: u64) {
        self.generate_secs = secs;
    }

    pub(crate) fn set_difficulty_status(&mut self, status: String) {
        self.difficulty_status = status;
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn miner_id(&self) -> &str {
        &self.miner_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn max_message_id_previous_block(&self) -> u64 {
        self.max_message_id_previous_block
    }

    pub fn reward(&self) -> i64 {
        self.reward
    }

    pub fn zeroes_in_hash(&self) -> u32 {
        self.zeroes_in_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn generate_secs(&self) -> u64 {
        self.generate_secs
    }

    pub fn difficulty_status(&self) -> &str {
        &self.difficulty_status
    }
}

/// Messages are serialized deterministically as JSON and hashed.
fn compute_messages_hash(messages: &[Message]) -> String {
    let json = serde_json::to_vec(messages).expect("serialize messages");
    sha256_hex(&json)
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Block:")?;
        writeln!(f, "Created by {}", self.miner_id)?;
        writeln!(f, "{} gets {} VC", self.miner_id, self.reward)?;
        writeln!(f, "Id: {}", self.id)?;
        writeln!(f, "Timestamp: {}", self.timestamp)?;
        writeln!(f, "Magic number: {}", self.nonce)?;
        writeln!(f, "Hash of the previous block:\n{}", self.previous_hash)?;
        writeln!(f, "Hash of the block:\n{}", self.compute_hash())?;
        write!(f, "Block data:")?;
        if self.messages.is_empty() {
            writeln!(f, "\nNo transactions")?;
        } else {
            for msg in &self.messages {
                write!(f, "\n {msg}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Block was generating for {} seconds", self.generate_secs)?;
        write!(f, "{}", self.difficulty_status)
    }
}
