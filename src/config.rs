//! Runtime settings for the simulator
//!
//! Defaults mirror the classic five-wallet simulation. Each setting can be
//! overridden through an environment variable.

use log::warn;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::block::GENESIS_PROOF;
use crate::blockchain::Address;

const DATA_FILE_KEY: &str = "LEDGER_DATA_FILE";
const WALLET_PREFIX_KEY: &str = "LEDGER_WALLET_PREFIX";
const WALLET_COUNT_KEY: &str = "LEDGER_WALLET_COUNT";
const SEED_MIN_KEY: &str = "LEDGER_SEED_MIN";
const SEED_MAX_KEY: &str = "LEDGER_SEED_MAX";
const TX_PER_BLOCK_KEY: &str = "LEDGER_TX_PER_BLOCK";
const PACING_MS_KEY: &str = "LEDGER_PACING_MS";

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// JSON file holding wallet balances and history
    pub data_file: PathBuf,
    pub wallet_prefix: String,
    pub wallet_count: usize,
    /// Lower bound for random initial balances
    pub seed_min: f64,
    /// Upper bound for random initial balances
    pub seed_max: f64,
    /// Pending transactions that trigger a seal
    pub transactions_per_block: usize,
    /// Placeholder proof stamped on every sealed block
    pub proof: u64,
    /// Pause between simulated transactions
    pub pacing: Duration,
    /// How many history entries the balance view shows
    pub recent_history: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            data_file: PathBuf::from("blockchain_data.json"),
            wallet_prefix: "0xWallet".to_string(),
            wallet_count: 5,
            seed_min: 1.0,
            seed_max: 100.0,
            transactions_per_block: 1,
            proof: GENESIS_PROOF,
            pacing: Duration::from_secs(1),
            recent_history: 5,
        }
    }
}

impl SimulatorConfig {
    /// Builds the configuration from defaults and environment overrides
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SimulatorConfig::default();

        if let Some(path) = lookup(DATA_FILE_KEY) {
            config.data_file = PathBuf::from(path);
        }
        if let Some(prefix) = lookup(WALLET_PREFIX_KEY) {
            config.wallet_prefix = prefix;
        }
        config.wallet_count = parse_or(&lookup, WALLET_COUNT_KEY, config.wallet_count);
        config.seed_min = parse_or(&lookup, SEED_MIN_KEY, config.seed_min);
        config.seed_max = parse_or(&lookup, SEED_MAX_KEY, config.seed_max);
        config.transactions_per_block = parse_or(&lookup, TX_PER_BLOCK_KEY, config.transactions_per_block);

        let pacing_ms = parse_or(&lookup, PACING_MS_KEY, config.pacing.as_millis() as u64);
        config.pacing = Duration::from_millis(pacing_ms);

        if config.wallet_count < 2 {
            warn!("{} must be at least 2, using 2", WALLET_COUNT_KEY);
            config.wallet_count = 2;
        }
        if config.transactions_per_block == 0 {
            warn!("{} must be at least 1, using 1", TX_PER_BLOCK_KEY);
            config.transactions_per_block = 1;
        }
        if !(config.seed_min > 0.0 && config.seed_min <= config.seed_max && config.seed_max.is_finite()) {
            let defaults = SimulatorConfig::default();
            warn!(
                "Invalid seed range [{}, {}], using [{}, {}]",
                config.seed_min, config.seed_max, defaults.seed_min, defaults.seed_max
            );
            config.seed_min = defaults.seed_min;
            config.seed_max = defaults.seed_max;
        }

        config
    }

    /// The fixed set of wallet addresses the shell offers
    pub fn wallet_ids(&self) -> Vec<Address> {
        (1..=self.wallet_count)
            .map(|i| Address(format!("{}{}", self.wallet_prefix, i)))
            .collect()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring invalid value {:?} for {}", raw, key);
                default
            }
        },
        None => default,
    }
}
