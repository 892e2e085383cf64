use std::time::Instant;

use log::{debug, error};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use super::{MAX_TRANSFER, Shutdown};
use crate::blockchain::{Block, Blockchain, TESTING_VIRTUAL_COINS};
use crate::error::CryptoError;
use crate::hash::meets_difficulty;
use crate::transaction::send_virtual_coins;
use crate::wallet::KeyPair;

/// One proof-of-work worker with its own identity and key pair.
#[derive(Debug)]
pub struct Miner {
    id: String,
    keys: KeyPair,
    contacts: Vec<String>,
}

impl Miner {
    pub fn new(index: usize) -> Self {
        Self {
            id: format!("miner{index}"),
            keys: KeyPair::generate(),
            contacts: Vec::new(),
        }
    }

    /// `count` miners, each knowing every other one as a transfer target.
    pub fn network(count: usize) -> Vec<Miner> {
        let mut miners: Vec<Miner> = (0..count).map(Miner::new).collect();
        let ids: Vec<String> = miners.iter().map(|m| m.id.clone()).collect();
        for miner in &mut miners {
            miner.set_contacts(&ids);
        }
        miners
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn public_key_hex(&self) -> String {
        self.keys.public_key_hex()
    }

    /// Everyone in `ids` except this miner.
    pub fn set_contacts(&mut self, ids: &[String]) {
        self.contacts = ids.iter().filter(|id| **id != self.id).cloned().collect();
    }

    pub fn contacts(&self) -> &[String] {
        &self.contacts
    }

    /// Chain balance plus the testing credit.
    pub fn settled_balance(&self, ledger: &Blockchain) -> i64 {
        ledger
            .get_virtual_coins_amount(&self.id)
            .saturating_add(TESTING_VIRTUAL_COINS)
    }

    /// Mine rounds until the ledger is complete or the run is cancelled.
    pub fn run(&self, ledger: &Blockchain, shutdown: &Shutdown) -> Result<(), CryptoError> {
        let mut rng = rand::thread_rng();
        while !ledger.is_complete() && !shutdown.is_cancelled() {
            ledger.wait_for_next_round(shutdown);
            if ledger.is_complete() || shutdown.is_cancelled() {
                break;
            }
            let block = self.generate(ledger, shutdown, &mut rng).inspect_err(|e| {
                error!("{} - signing primitive failed: {e}", self.id);
            })?;
            if let Some(block) = block {
                if !ledger.accept_block(block) {
                    ledger.release_magic_number();
                }
            }
        }
        debug!("{} - done", self.id);
        Ok(())
    }

    /// Build a candidate from the ledger's current state and search it.
    /// `None` when another miner won the round, the candidate went stale,
    /// or the run was cancelled.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        ledger: &Blockchain,
        shutdown: &Shutdown,
        rng: &mut R,
    ) -> Result<Option<Block>, CryptoError> {
        let start = Instant::now();
        let template = ledger.block_template();
        if template.id > ledger.chain_size() as u64 {
            return Ok(None);
        }
        let zeroes = template.zeroes_in_hash;
        let mut block = template.into_block(self.id.clone());

        let found = self.find_magic_number(&mut block, zeroes, ledger, shutdown, rng)?;
        block.set_generate_secs(start.elapsed().as_secs());
        Ok(found.then_some(block))
    }

    /// Random nonce trials until the hash has `zeroes` leading zeros and
    /// this miner claims the round. Each trial may also emit a transfer,
    /// with probability `10^-(zeroes + 1)`.
    pub fn find_magic_number<R: Rng + ?Sized>(
        &self,
        block: &mut Block,
        zeroes: u32,
        ledger: &Blockchain,
        shutdown: &Shutdown,
        rng: &mut R,
    ) -> Result<bool, CryptoError> {
        let chance_to_send = 10f64.powi(-(zeroes as i32 + 1));
        debug!("{} searching for block: {}", self.id, block.id());

        while !ledger.is_magic_number_found() && !shutdown.is_cancelled() {
            block.set_nonce(rng.next_u64());
            let hash = block.compute_hash();

            if ledger.block_counter() + 1 != block.id() {
                debug!("{} - block {} is stale", self.id, block.id());
                return Ok(false);
            }
            if rng.gen_bool(chance_to_send) {
                self.send_virtual_coins(ledger, rng)?;
            }
            if meets_difficulty(&hash, zeroes) && ledger.try_claim_magic_number(block.id()) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn send_virtual_coins<R: Rng + ?Sized>(
        &self,
        ledger: &Blockchain,
        rng: &mut R,
    ) -> Result<(), CryptoError> {
        let Some(receiver) = self.contacts.choose(rng) else {
            return Ok(());
        };
        let amount = rng.gen_range(1..=MAX_TRANSFER);
        send_virtual_coins(ledger, &self.id, receiver, amount, &self.keys)?;
        Ok(())
    }
}
