use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, info};

use super::{
    Block, GENESIS_PREVIOUS_HASH, MAX_ZEROES_IN_HASH, MessagePool, TESTING_VIRTUAL_COINS,
    VIRTUAL_COINS_REWARD, adjust_zeroes_in_hash,
};
use crate::error::CryptoError;
use crate::hash::meets_difficulty;
use crate::mining::Shutdown;
use crate::transaction::Message;

/// How long an idle miner sleeps between checks of the found flag.
const IDLE_BACKOFF: Duration = Duration::from_millis(50);

/// Everything a miner needs to build a candidate, read under one lock.
#[derive(Debug, Clone)]
pub struct BlockTemplate {
    pub id: u64,
    pub previous_hash: String,
    pub messages: Vec<Message>,
    pub zeroes_in_hash: u32,
    pub max_message_id_previous_block: u64,
    pub reward: i64,
}

impl BlockTemplate {
    pub fn into_block(self, miner_id: String) -> Block {
        Block::new(
            self.id,
            self.previous_hash,
            self.messages,
            miner_id,
            self.zeroes_in_hash,
            self.max_message_id_previous_block,
            self.reward,
        )
    }
}

#[derive(Debug)]
struct LedgerState {
    chain: Vec<Block>,
    zeroes_in_hash: u32,
    pool: MessagePool,
}

impl LedgerState {
    fn last_block_hash(&self) -> String {
        self.chain
            .last()
            .map(Block::compute_hash)
            .unwrap_or_else(|| GENESIS_PREVIOUS_HASH.to_string())
    }

    fn is_block_valid(&self, block: &Block) -> bool {
        block.previous_hash() == self.last_block_hash()
            && meets_difficulty(&block.compute_hash(), self.zeroes_in_hash)
    }

    /// Replays the whole chain; not cached. Saturates at the `i64` bounds.
    ///
    /// A transfer to oneself counts only as a debit.
    fn balance_of(&self, user: &str) -> i64 {
        let mut amount = 0i64;
        for block in &self.chain {
            if block.miner_id() == user {
                amount = amount.saturating_add(VIRTUAL_COINS_REWARD);
            }
            for tx in block.messages().iter().filter_map(|m| m.transaction.as_ref()) {
                let value = coins(tx.amount);
                if tx.sender == user {
                    amount = amount.saturating_sub(value);
                } else if tx.receiver == user {
                    amount = amount.saturating_add(value);
                }
            }
        }
        amount
    }

    fn is_message_valid(&self, message: &Message) -> Result<bool, CryptoError> {
        if message.id <= self.pool.max_message_id_previous_block() {
            return Ok(false);
        }
        let Some(tx) = &message.transaction else {
            return Ok(false);
        };
        let spendable = self.balance_of(&tx.sender).saturating_add(TESTING_VIRTUAL_COINS);
        if coins(tx.amount) > spendable {
            return Ok(false);
        }
        message.is_signature_valid()
    }
}

fn coins(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

/// The shared ledger: canonical chain, mempool queues, counters and the
/// single-winner flag.
///
/// Chain, difficulty and queues live behind one mutex, so acceptance,
/// retargeting and rotation commit as a unit. The block counter, message
/// counter and found flag are atomics that miners poll without locking.
#[derive(Debug)]
pub struct Blockchain {
    state: Mutex<LedgerState>,
    round_changed: Condvar,
    block_counter: AtomicU64,
    message_counter: AtomicU64,
    magic_number_found: AtomicBool,
    chain_size: usize,
}

impl Blockchain {
    /// An empty ledger that accepts at most `chain_size` blocks.
    pub fn new(chain_size: usize) -> Self {
        Self::with_difficulty(chain_size, 0)
    }

    pub fn with_difficulty(chain_size: usize, zeroes_in_hash: u32) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                chain: Vec::new(),
                zeroes_in_hash: zeroes_in_hash.min(MAX_ZEROES_IN_HASH),
                pool: MessagePool::new(),
            }),
            round_changed: Condvar::new(),
            block_counter: AtomicU64::new(0),
            message_counter: AtomicU64::new(0),
            magic_number_found: AtomicBool::new(false),
            chain_size,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().expect("mutex poisoned")
    }

    /// Validate and append `block`; on success retarget difficulty, rotate
    /// the mempool and clear the found flag. Invalid blocks are dropped.
    pub fn accept_block(&self, mut block: Block) -> bool {
        let mut state = self.lock_state();
        if state.chain.len() >= self.chain_size {
            debug!("LEDGER - block #{} refused: chain is complete", block.id());
            return false;
        }
        if !state.is_block_valid(&block) {
            debug!("LEDGER - block #{} from {} rejected", block.id(), block.miner_id());
            return false;
        }

        let (next, status) = adjust_zeroes_in_hash(state.zeroes_in_hash, block.generate_secs());
        block.set_difficulty_status(status);
        info!(
            "LEDGER - accepted block #{} from {} (messages={}, {}s, zeroes {} -> {})",
            block.id(),
            block.miner_id(),
            block.messages().len(),
            block.generate_secs(),
            state.zeroes_in_hash,
            next
        );

        self.block_counter.store(block.id(), Ordering::SeqCst);
        state.chain.push(block);
        state.zeroes_in_hash = next;
        state.pool.rotate();
        self.magic_number_found.store(false, Ordering::SeqCst);
        drop(state);
        self.round_changed.notify_all();
        true
    }

    /// Linkage to the current tip and the current difficulty.
    pub fn is_block_valid(&self, block: &Block) -> bool {
        self.lock_state().is_block_valid(block)
    }

    /// Walk consecutive pairs checking linkage, each block's own recorded
    /// difficulty and its messages.
    pub fn is_chain_valid(&self) -> Result<bool, CryptoError> {
        let state = self.lock_state();
        for pair in state.chain.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.previous_hash() != previous.compute_hash() {
                return Ok(false);
            }
            if !meets_difficulty(&current.compute_hash(), current.zeroes_in_hash()) {
                return Ok(false);
            }
            if !Self::are_valid_block_messages(current)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Every id must exceed the block's watermark and the previous id in the
    /// block, and every signature must verify.
    pub fn are_valid_block_messages(block: &Block) -> Result<bool, CryptoError> {
        let mut max_message_id = block.max_message_id_previous_block();
        for msg in block.messages() {
            if msg.id <= max_message_id {
                return Ok(false);
            }
            max_message_id = msg.id;
            if !msg.is_signature_valid()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Mempool admission: fresh id, a transaction the sender can cover with
    /// balance plus testing credit, and a valid signature.
    pub fn is_message_valid(&self, message: &Message) -> Result<bool, CryptoError> {
        self.lock_state().is_message_valid(message)
    }

    /// Queue `message` if it is valid. Returns whether it was admitted.
    pub fn receive_message(&self, message: Message) -> Result<bool, CryptoError> {
        let mut state = self.lock_state();
        if !state.is_message_valid(&message)? {
            debug!("MEMPOOL - dropped message #{}", message.id);
            return Ok(false);
        }
        debug!("MEMPOOL - admitted message #{}: {}", message.id, message.text());
        state.pool.push(message);
        Ok(true)
    }

    /// Balance of `user` replayed from the accepted chain.
    pub fn get_virtual_coins_amount(&self, user: &str) -> i64 {
        self.lock_state().balance_of(user)
    }

    /// Issue the next message id (first id is 1).
    pub fn next_message_id(&self) -> u64 {
        self.message_counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn block_template(&self) -> BlockTemplate {
        let state = self.lock_state();
        BlockTemplate {
            id: self.block_counter.load(Ordering::SeqCst) + 1,
            previous_hash: state.last_block_hash(),
            messages: state.pool.previous_snapshot(),
            zeroes_in_hash: state.zeroes_in_hash,
            max_message_id_previous_block: state.pool.max_message_id_previous_block(),
            reward: VIRTUAL_COINS_REWARD,
        }
    }

    pub fn is_magic_number_found(&self) -> bool {
        self.magic_number_found.load(Ordering::SeqCst)
    }

    /// Claim the round for a candidate with `block_id`.
    ///
    /// Compare-and-set on the found flag; a claimant whose candidate went
    /// stale in the meantime gives the flag back and loses.
    pub fn try_claim_magic_number(&self, block_id: u64) -> bool {
        if self
            .magic_number_found
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        if self.block_counter.load(Ordering::SeqCst) + 1 != block_id {
            self.release_magic_number();
            return false;
        }
        true
    }

    /// Clear the found flag without accepting anything.
    pub fn release_magic_number(&self) {
        let _state = self.lock_state();
        self.magic_number_found.store(false, Ordering::SeqCst);
        self.round_changed.notify_all();
    }

    /// Block while another miner holds the found flag, or until `shutdown`.
    pub fn wait_for_next_round(&self, shutdown: &Shutdown) {
        let mut state = self.lock_state();
        while self.is_magic_number_found() && !shutdown.is_cancelled() {
            state = self
                .round_changed
                .wait_timeout(state, IDLE_BACKOFF)
                .expect("mutex poisoned")
                .0;
        }
    }

    pub fn len(&self) -> usize {
        self.lock_state().chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Target number of blocks for this run.
    pub fn chain_size(&self) -> usize {
        self.chain_size
    }

    pub fn is_complete(&self) -> bool {
        self.len() >= self.chain_size
    }

    pub fn last_block_hash(&self) -> String {
        self.lock_state().last_block_hash()
    }

    /// Id of the last accepted block (0 before the first).
    pub fn block_counter(&self) -> u64 {
        self.block_counter.load(Ordering::SeqCst)
    }

    pub fn zeroes_in_hash(&self) -> u32 {
        self.lock_state().zeroes_in_hash
    }

    pub fn set_zeroes_in_hash(&self, zeroes: u32) {
        self.lock_state().zeroes_in_hash = zeroes.min(MAX_ZEROES_IN_HASH);
    }

    pub fn max_message_id_previous_block(&self) -> u64 {
        self.lock_state().pool.max_message_id_previous_block()
    }

    pub fn previous_block_messages(&self) -> Vec<Message> {
        self.lock_state().pool.previous_snapshot()
    }

    pub fn current_block_messages(&self) -> Vec<Message> {
        self.lock_state().pool.current().to_vec()
    }

    /// Copy of the accepted blocks.
    pub fn chain(&self) -> Vec<Block> {
        self.lock_state().chain.clone()
    }

    pub fn reward_amount(&self) -> i64 {
        VIRTUAL_COINS_REWARD
    }
}
