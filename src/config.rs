use std::env;
use std::thread;
use std::time::Duration;

use crate::blockchain::MAX_ZEROES_IN_HASH;

/// Default number of miners.
pub const DEFAULT_MINERS: usize = 10;

/// Default target chain length.
pub const DEFAULT_CHAIN_SIZE: usize = 15;

/// Default wall-clock budget for a run (ten minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Knobs for one simulation run, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub miners: usize,
    pub chain_size: usize,
    pub pool_size: usize,
    pub timeout: Duration,
    pub initial_difficulty: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            miners: DEFAULT_MINERS,
            chain_size: DEFAULT_CHAIN_SIZE,
            pool_size: default_pool_size(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            initial_difficulty: 0,
        }
    }
}

fn default_pool_size() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

impl SimulationConfig {
    /// Load `.env` if present, then read `MINERS`, `CHAIN_SIZE`, `POOL_SIZE`,
    /// `TIMEOUT_SECS` and `INITIAL_DIFFICULTY`.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`SimulationConfig::from_env`] over an arbitrary lookup.
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let count = |key: &str, default: usize| {
            lookup(key)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(default)
        };

        Self {
            miners: count("MINERS", defaults.miners),
            chain_size: count("CHAIN_SIZE", defaults.chain_size),
            pool_size: count("POOL_SIZE", defaults.pool_size),
            timeout: lookup("TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .map_or(defaults.timeout, Duration::from_secs),
            initial_difficulty: lookup("INITIAL_DIFFICULTY")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(defaults.initial_difficulty)
                .min(MAX_ZEROES_IN_HASH),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = SimulationConfig::from_lookup(lookup(&[]));
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.miners, 10);
        assert_eq!(config.chain_size, 15);
        assert_eq!(config.timeout, Duration::from_secs(600));
        assert!(config.pool_size >= 1);
    }

    #[test]
    fn values_are_parsed() {
        let config = SimulationConfig::from_lookup(lookup(&[
            ("MINERS", "4"),
            ("CHAIN_SIZE", " 6 "),
            ("POOL_SIZE", "2"),
            ("TIMEOUT_SECS", "30"),
            ("INITIAL_DIFFICULTY", "3"),
        ]));
        assert_eq!(config.miners, 4);
        assert_eq!(config.chain_size, 6);
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.initial_difficulty, 3);
    }

    #[test]
    fn bad_values_fall_back() {
        let config = SimulationConfig::from_lookup(lookup(&[
            ("MINERS", "0"),
            ("CHAIN_SIZE", "lots"),
            ("INITIAL_DIFFICULTY", "40"),
        ]));
        assert_eq!(config.miners, DEFAULT_MINERS);
        assert_eq!(config.chain_size, DEFAULT_CHAIN_SIZE);
        assert_eq!(config.initial_difficulty, MAX_ZEROES_IN_HASH);
    }
}
