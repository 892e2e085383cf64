//! Single-process proof-of-work ledger simulation: a shared chain, a pool of
//! racing miners and a signed-transfer mempool.

pub mod blockchain;
pub mod config;
pub mod error;
pub mod hash;
pub mod mining;
pub mod transaction;
pub mod wallet;
