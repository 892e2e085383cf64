pub mod miner;
pub mod pool;
pub mod shutdown;

pub use miner::Miner;
pub use pool::{MiningPool, RunOutcome};
pub use shutdown::Shutdown;

/// Upper bound of a random transfer emitted during search.
pub const MAX_TRANSFER: u64 = 50;
