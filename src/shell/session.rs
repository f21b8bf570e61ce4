use std::io::{self, BufRead, Write};
use std::thread;

use log::{error, info};

use super::menu::{self, MenuChoice};
use super::render;
use crate::blockchain::{
    Address, HistoryEntry, Ledger, LedgerError, PersistedState, StateStore, WalletError, WalletStore,
};
use crate::config::SimulatorConfig;

/// Outcome of asking for a sender and a receiver
#[derive(Debug, PartialEq)]
enum Selection {
    /// Two distinct wallets
    Pair(Address, Address),
    /// The input was rejected; the attempt is skipped
    Invalid,
    /// Input ran out
    Closed,
}

/// Interactive menu driving the ledger
///
/// All state is handed in at construction; the shell only reads commands
/// from `input` and writes prompts and results to `output`.
pub struct Shell<R, W> {
    config: SimulatorConfig,
    ledger: Ledger,
    wallets: WalletStore,
    history: Vec<HistoryEntry>,
    store: StateStore,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(
        config: SimulatorConfig,
        ledger: Ledger,
        wallets: WalletStore,
        history: Vec<HistoryEntry>,
        store: StateStore,
        input: R,
        output: W,
    ) -> Self {
        Shell {
            config,
            ledger,
            wallets,
            history,
            store,
            input,
            output,
        }
    }

    /// Runs the menu loop until the user exits or input ends
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "Welcome to Ethereal Blockchain Simulator!")?;

        loop {
            writeln!(self.output, "\nMenu:")?;
            for choice in MenuChoice::ALL {
                writeln!(self.output, "{}", choice)?;
            }

            let line = match self.prompt("Enter your choice (1/2/3/4): ")? {
                Some(line) => line,
                None => break,
            };

            match line.parse::<MenuChoice>() {
                Ok(MenuChoice::Simulate) => {
                    if !self.simulate()? {
                        break;
                    }
                }
                Ok(MenuChoice::ShowBalances) => {
                    render::balances(&mut self.output, &self.wallets, &self.history, self.config.recent_history)?
                }
                Ok(MenuChoice::ShowChain) => {
                    render::chain(&mut self.output, self.ledger.chain(), self.ledger.is_valid())?
                }
                Ok(MenuChoice::Exit) => {
                    writeln!(self.output, "Thank you for using Ethereal Blockchain Simulator! Goodbye.")?;
                    return Ok(());
                }
                Err(message) => writeln!(self.output, "{}", message)?,
            }
        }

        info!("Input closed, leaving the simulator");
        Ok(())
    }

    /// Runs one simulation round
    ///
    /// Returns false once input is exhausted.
    fn simulate(&mut self) -> io::Result<bool> {
        let count = loop {
            let line = match self.prompt("Enter the number of transactions you want to simulate: ")? {
                Some(line) => line,
                None => return Ok(false),
            };
            match menu::parse_count(&line) {
                Ok(count) => break count,
                Err(message) => writeln!(self.output, "{}", message)?,
            }
        };

        let wallet_ids = self.config.wallet_ids();
        for _ in 0..count {
            render::wallet_menu(&mut self.output, &wallet_ids, &self.wallets)?;

            let (sender, recipient) = match self.select_wallets(&wallet_ids)? {
                Selection::Pair(sender, recipient) => (sender, recipient),
                Selection::Invalid => continue,
                Selection::Closed => return Ok(false),
            };

            let amount = match self.prompt("Enter the ETH amount to send: ")? {
                Some(line) => match menu::parse_amount(&line) {
                    Ok(amount) => amount,
                    Err(message) => {
                        writeln!(self.output, "{}", message)?;
                        continue;
                    }
                },
                None => return Ok(false),
            };

            self.execute_transfer(&sender, &recipient, amount)?;
        }

        if !self.ledger.pending().is_empty() {
            self.seal()?;
        }

        writeln!(self.output, "Transactions simulated successfully!")?;
        Ok(true)
    }

    /// Prompts for a distinct sender and receiver
    fn select_wallets(&mut self, wallet_ids: &[Address]) -> io::Result<Selection> {
        let count = wallet_ids.len();

        let sender_line = match self.prompt(&format!("Enter the sender's wallet number (1 to {}): ", count))? {
            Some(line) => line,
            None => return Ok(Selection::Closed),
        };
        let recipient_line = match self.prompt(&format!(
            "Enter the receiver's wallet number (1 to {}, different from sender): ",
            count
        ))? {
            Some(line) => line,
            None => return Ok(Selection::Closed),
        };

        let sender = menu::parse_wallet_index(&sender_line, count);
        let recipient = menu::parse_wallet_index(&recipient_line, count);

        match (sender, recipient) {
            (Ok(sender), Ok(recipient)) if sender != recipient => {
                Ok(Selection::Pair(wallet_ids[sender].clone(), wallet_ids[recipient].clone()))
            }
            (Ok(_), Ok(_)) => {
                writeln!(self.output, "Invalid input. Sender and receiver must be different wallets.")?;
                Ok(Selection::Invalid)
            }
            (Err(message), _) | (_, Err(message)) => {
                writeln!(self.output, "{}", message)?;
                Ok(Selection::Invalid)
            }
        }
    }

    fn execute_transfer(&mut self, sender: &Address, recipient: &Address, amount: f64) -> io::Result<()> {
        match self.ledger.submit_transfer(&mut self.wallets, sender, recipient, amount) {
            Ok(block_index) => {
                writeln!(
                    self.output,
                    "Simulating Ethereal Transaction: {} -> {}, Amount: {} ETH",
                    sender, recipient, amount
                )?;
                info!("Transaction will be added to block {}", block_index);
                if let Some(record) = self.ledger.pending().last() {
                    self.history.push(HistoryEntry::from(record));
                }

                if self.ledger.pending().len() >= self.config.transactions_per_block {
                    self.seal()?;
                }
                self.persist()?;
                self.pace();
            }
            Err(LedgerError::Wallet(WalletError::UnknownSender(address))) => {
                writeln!(self.output, "Sender {} not found in wallet balances. Transaction canceled.", address)?;
            }
            Err(LedgerError::Wallet(WalletError::InsufficientFunds { required, available })) => {
                writeln!(
                    self.output,
                    "Insufficient balance in {}'s wallet: {} ETH required, {} ETH available. Transaction canceled.",
                    sender, required, available
                )?;
            }
            Err(err) => writeln!(self.output, "Transaction canceled: {}", err)?,
        }

        Ok(())
    }

    fn seal(&mut self) -> io::Result<()> {
        if let Err(err) = self.ledger.seal_block(self.config.proof) {
            error!("Failed to seal block: {}", err);
            writeln!(self.output, "Failed to seal block: {}", err)?;
        }
        Ok(())
    }

    /// Saves balances and history, reporting failures without ending the session
    fn persist(&mut self) -> io::Result<()> {
        let state = PersistedState {
            wallet_balances: self.wallets.balances().clone(),
            transactions: self.history.clone(),
        };

        if let Err(err) = self.store.save(&state) {
            error!("Failed to save state to {}: {}", self.store.path().display(), err);
            writeln!(self.output, "Warning: failed to save state: {}", err)?;
        }
        Ok(())
    }

    fn pace(&self) {
        if !self.config.pacing.is_zero() {
            thread::sleep(self.config.pacing);
        }
    }

    /// Writes a prompt and reads one line; `None` on end of input
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Hands back the state owned by the shell
    #[cfg(test)]
    pub fn into_parts(self) -> (Ledger, WalletStore, Vec<HistoryEntry>) {
        (self.ledger, self.wallets, self.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Cursor;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> SimulatorConfig {
        SimulatorConfig {
            data_file: dir.path().join("blockchain_data.json"),
            pacing: Duration::ZERO,
            ..SimulatorConfig::default()
        }
    }

    fn seeded_wallets(config: &SimulatorConfig) -> WalletStore {
        let balances: BTreeMap<Address, f64> = config
            .wallet_ids()
            .into_iter()
            .zip([10.0, 20.0, 30.0, 40.0, 50.0])
            .collect();
        WalletStore::from_balances(balances)
    }

    fn run_shell(config: SimulatorConfig, script: &str) -> (String, Ledger, WalletStore, Vec<HistoryEntry>) {
        let store = StateStore::new(&config.data_file);
        let wallets = seeded_wallets(&config);
        let mut output = Vec::new();

        let (ledger, wallets, history) = {
            let mut shell = Shell::new(
                config,
                Ledger::new(),
                wallets,
                Vec::new(),
                store,
                Cursor::new(script.to_string()),
                &mut output,
            );
            shell.run().unwrap();
            shell.into_parts()
        };

        (String::from_utf8(output).unwrap(), ledger, wallets, history)
    }

    #[test]
    fn test_exit() {
        let dir = TempDir::new().unwrap();

        let (output, ledger, _, _) = run_shell(test_config(&dir), "4\n");

        assert!(output.starts_with("Welcome to Ethereal Blockchain Simulator!"));
        assert!(output.contains("Goodbye."));
        assert_eq!(ledger.chain().len(), 1);
    }

    #[test]
    fn test_invalid_menu_choice_reprompts() {
        let dir = TempDir::new().unwrap();

        let (output, _, _, _) = run_shell(test_config(&dir), "9\n4\n");

        assert!(output.contains("Invalid choice. Please select a valid option (1/2/3/4)."));
        assert!(output.contains("Goodbye."));
    }

    #[test]
    fn test_end_of_input_ends_session() {
        let dir = TempDir::new().unwrap();

        let (output, _, _, _) = run_shell(test_config(&dir), "1\n2\n1\n");

        assert!(!output.contains("Goodbye."));
    }

    #[test]
    fn test_simulated_transfer_seals_and_persists() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let data_file = config.data_file.clone();

        let (output, ledger, wallets, history) = run_shell(config, "1\n1\n1\n2\n5\n4\n");

        assert!(output.contains("Simulating Ethereal Transaction: 0xWallet1 -> 0xWallet2, Amount: 5 ETH"));
        assert!(output.contains("Transactions simulated successfully!"));
        assert_eq!(wallets.get_balance(&Address::from("0xWallet1")), 5.0);
        assert_eq!(wallets.get_balance(&Address::from("0xWallet2")), 25.0);
        assert_eq!(history.len(), 1);
        assert_eq!(ledger.chain().len(), 2);
        assert_eq!(ledger.chain()[1].transactions.len(), 1);
        assert!(ledger.pending().is_empty());
        assert!(ledger.is_valid());

        let saved = StateStore::new(&data_file).load().unwrap();
        assert_eq!(saved.wallet_balances, wallets.balances().clone());
        assert_eq!(saved.transactions, history);
    }

    #[test]
    fn test_batched_sealing() {
        let dir = TempDir::new().unwrap();
        let config = SimulatorConfig {
            transactions_per_block: 2,
            ..test_config(&dir)
        };

        let script = "1\n3\n1\n2\n1\n2\n3\n1\n3\n4\n1\n4\n";
        let (_, ledger, wallets, _) = run_shell(config, script);

        let chain = ledger.chain();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[1].transactions.len(), 2);
        assert_eq!(chain[2].transactions.len(), 1);
        assert!(ledger.is_valid());
        assert_eq!(wallets.total(), 150.0);
    }

    #[test]
    fn test_insufficient_balance_is_rejected() {
        let dir = TempDir::new().unwrap();

        let (output, ledger, wallets, history) = run_shell(test_config(&dir), "1\n1\n1\n2\n1000\n4\n");

        assert!(output.contains("Insufficient balance in 0xWallet1's wallet"));
        assert_eq!(wallets.get_balance(&Address::from("0xWallet1")), 10.0);
        assert!(history.is_empty());
        assert_eq!(ledger.chain().len(), 1);
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn test_invalid_wallet_selection() {
        let dir = TempDir::new().unwrap();

        let (output, _, wallets, history) = run_shell(test_config(&dir), "1\n2\n3\n3\n0\n9\n4\n");

        assert!(output.contains("Sender and receiver must be different wallets."));
        assert!(output.contains("Invalid wallet selection. Choose a number from 1 to 5."));
        assert!(history.is_empty());
        assert_eq!(wallets, seeded_wallets(&test_config(&dir)));
    }

    #[test]
    fn test_select_wallets_outcomes() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let ids = config.wallet_ids();
        let store = StateStore::new(&config.data_file);
        let wallets = seeded_wallets(&config);
        let mut output = Vec::new();
        let mut shell = Shell::new(
            config,
            Ledger::new(),
            wallets,
            Vec::new(),
            store,
            Cursor::new("2\n5\n3\n3\nx\n1\n4\n".to_string()),
            &mut output,
        );

        assert_eq!(
            shell.select_wallets(&ids).unwrap(),
            Selection::Pair(ids[1].clone(), ids[4].clone())
        );
        assert_eq!(shell.select_wallets(&ids).unwrap(), Selection::Invalid);
        assert_eq!(shell.select_wallets(&ids).unwrap(), Selection::Invalid);
        assert_eq!(shell.select_wallets(&ids).unwrap(), Selection::Closed);
    }

    #[test]
    fn test_invalid_amount() {
        let dir = TempDir::new().unwrap();

        let (output, _, _, history) = run_shell(test_config(&dir), "1\n1\n1\n2\n-5\n4\n");

        assert!(output.contains("Amount must be a non-negative number."));
        assert!(history.is_empty());
    }

    #[test]
    fn test_invalid_count_reprompts() {
        let dir = TempDir::new().unwrap();

        let (output, _, _, _) = run_shell(test_config(&dir), "1\nmany\n0\n4\n");

        assert!(output.contains("Invalid number of transactions"));
        assert!(output.contains("Transactions simulated successfully!"));
    }

    #[test]
    fn test_display_views() {
        let dir = TempDir::new().unwrap();

        let (output, _, _, _) = run_shell(test_config(&dir), "1\n1\n5\n4\n2.5\n2\n3\n4\n");

        assert!(output.contains("Wallet Balances:"));
        assert!(output.contains("0xWallet5: 47.5 ETH"));
        assert!(output.contains("1. Sender: 0xWallet5, Receiver: 0xWallet4, Amount: 2.5 ETH"));
        assert!(output.contains("Block 2:"));
        assert!(output.contains("- Previous Hash: 1\n"));
    }

    #[test]
    fn test_save_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let config = SimulatorConfig {
            data_file: dir.path().join("missing").join("state.json"),
            ..test_config(&dir)
        };

        let (output, _, wallets, _) = run_shell(config, "1\n1\n1\n2\n5\n4\n");

        assert!(output.contains("Warning: failed to save state"));
        assert!(output.contains("Goodbye."));
        assert_eq!(wallets.get_balance(&Address::from("0xWallet2")), 25.0);
    }
}
