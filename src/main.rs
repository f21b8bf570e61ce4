use anyhow::Context;
use log::info;

use std::io;

mod blockchain;
mod config;
mod shell;

use blockchain::{Ledger, StateStore, WalletStore};
use config::SimulatorConfig;
use shell::Shell;

// Restore balances and history, then top up any wallet without a balance
fn initialize_state(
    config: &SimulatorConfig,
    store: &StateStore,
) -> Result<(WalletStore, Vec<blockchain::HistoryEntry>), blockchain::WalletError> {
    let state = store.load_or_default();
    let mut wallets = WalletStore::from_balances(state.wallet_balances);

    let wallet_ids = config.wallet_ids();
    let known = wallet_ids.iter().filter(|id| wallets.contains(id)).count();
    if known < wallet_ids.len() {
        info!("Seeding {} wallet(s) with random balances", wallet_ids.len() - known);
    }
    wallets.seed_random(&wallet_ids, config.seed_min, config.seed_max, &mut rand::thread_rng())?;
    info!("Total balance across wallets: {}", wallets.total());

    Ok((wallets, state.transactions))
}

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let config = SimulatorConfig::from_env();
    let store = StateStore::new(&config.data_file);
    info!("Using state file {}", store.path().display());

    let (wallets, history) = initialize_state(&config, &store).context("Failed to seed wallets")?;

    let ledger = Ledger::new();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(config, ledger, wallets, history, store, stdin.lock(), stdout.lock());

    shell.run().context("Interactive session failed")?;

    Ok(())
}
