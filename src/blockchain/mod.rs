pub mod block;
pub mod difficulty;
pub mod mempool;
pub mod model;

pub use block::Block;
pub use difficulty::adjust_zeroes_in_hash;
pub use mempool::MessagePool;
pub use model::{BlockTemplate, Blockchain};

/// Previous-hash of the first block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Coins credited to the miner of each accepted block.
pub const VIRTUAL_COINS_REWARD: i64 = 100;

/// Starting allowance every identity may spend before earning anything.
pub const TESTING_VIRTUAL_COINS: i64 = 100;

/// Difficulty ceiling (leading zero hex digits).
pub const MAX_ZEROES_IN_HASH: u32 = 7;

/// Blocks slower than this lower the difficulty.
pub const SLOW_BLOCK_SECS: u64 = 60;

/// Blocks faster than this raise the difficulty.
pub const FAST_BLOCK_SECS: u64 = 15;
