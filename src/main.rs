use std::sync::Arc;

use log::{info, warn};

use pow_ledger::blockchain::Blockchain;
use pow_ledger::config::SimulationConfig;
use pow_ledger::error::CryptoError;
use pow_ledger::mining::{Miner, MiningPool, RunOutcome};

fn main() -> Result<(), CryptoError> {
    let config = SimulationConfig::from_env();
    env_logger::init();

    println!(
        "⛓️ Starting {} miners on {} threads for a chain of {} blocks",
        config.miners, config.pool_size, config.chain_size
    );

    let ledger = Arc::new(Blockchain::with_difficulty(
        config.chain_size,
        config.initial_difficulty,
    ));
    let miners = Miner::network(config.miners);
    let pool = MiningPool::new(Arc::clone(&ledger), config.pool_size);

    match pool.run(&miners, config.timeout)? {
        RunOutcome::Completed => info!("run completed with {} blocks", ledger.len()),
        RunOutcome::TimedOut => warn!(
            "run timed out after {:?} with {} blocks",
            config.timeout,
            ledger.len()
        ),
        RunOutcome::Cancelled => warn!("run cancelled with {} blocks", ledger.len()),
    }

    for block in ledger.chain() {
        println!("\n{block}");
    }
    println!();
    for miner in &miners {
        println!("{} has {} VC.", miner.id(), miner.settled_balance(&ledger));
    }
    println!("Chain valid: {}", ledger.is_chain_valid()?);
    Ok(())
}
