use std::io::{self, Write};

use crate::blockchain::{Address, Block, HistoryEntry, WalletStore};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lists the selectable wallets with their current balances
pub fn wallet_menu<W: Write>(out: &mut W, wallet_ids: &[Address], wallets: &WalletStore) -> io::Result<()> {
    writeln!(out, "\nAvailable Wallets with Balances:")?;
    for (i, address) in wallet_ids.iter().enumerate() {
        writeln!(out, "{}. {}: {} ETH", i + 1, address, wallets.get_balance(address))?;
    }
    Ok(())
}

/// Shows every balance followed by the most recent transfers
pub fn balances<W: Write>(
    out: &mut W,
    wallets: &WalletStore,
    history: &[HistoryEntry],
    recent: usize,
) -> io::Result<()> {
    writeln!(out, "\nWallet Balances:")?;
    for (address, balance) in wallets.balances() {
        writeln!(out, "{}: {} ETH", address, balance)?;
    }

    writeln!(out, "\nRecent Transactions:")?;
    let start = history.len().saturating_sub(recent);
    for (i, HistoryEntry(sender, recipient, amount)) in history[start..].iter().enumerate() {
        writeln!(
            out,
            "{}. Sender: {}, Receiver: {}, Amount: {} ETH",
            i + 1,
            sender,
            recipient,
            amount
        )?;
    }
    Ok(())
}

/// Prints every block of the chain
pub fn chain<W: Write>(out: &mut W, blocks: &[Block], valid: bool) -> io::Result<()> {
    writeln!(out, "\nBlockchain:")?;
    for block in blocks {
        writeln!(out, "Block {}:", block.index)?;
        writeln!(out, "- Timestamp: {} UTC", block.timestamp.format(TIMESTAMP_FORMAT))?;
        writeln!(out, "- Previous Hash: {}", block.previous_hash)?;
        writeln!(out, "- Proof: {}", block.proof)?;
        writeln!(out, "- Transactions:")?;

        for transaction in &block.transactions {
            writeln!(out, "  - Sender: {}", transaction.sender)?;
            writeln!(out, "  - Receiver: {}", transaction.recipient)?;
            writeln!(out, "  - Amount: {} ETH", transaction.amount)?;
        }
    }

    if !valid {
        writeln!(out, "\nWarning: chain failed validation")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::transaction::TransactionRecord;
    use crate::blockchain::Ledger;
    use std::collections::BTreeMap;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_recent_history_is_limited() {
        let mut balances = BTreeMap::new();
        balances.insert(Address::from("A"), 1.5);
        let wallets = WalletStore::from_balances(balances);
        let history: Vec<HistoryEntry> = (1..=7)
            .map(|i| HistoryEntry(Address::from("A"), Address::from("B"), i as f64))
            .collect();

        let text = render(|out| super::balances(out, &wallets, &history, 5));

        assert!(text.contains("A: 1.5 ETH"));
        assert!(text.contains("1. Sender: A, Receiver: B, Amount: 3 ETH"));
        assert!(text.contains("5. Sender: A, Receiver: B, Amount: 7 ETH"));
        assert!(!text.contains("Amount: 2 ETH"));
    }

    #[test]
    fn test_chain_rendering() {
        let mut ledger = Ledger::new();
        let mut balances = BTreeMap::new();
        balances.insert(Address::from("A"), 10.0);
        let mut wallets = WalletStore::from_balances(balances);
        ledger
            .submit_transfer(&mut wallets, &Address::from("A"), &Address::from("B"), 2.5)
            .unwrap();
        ledger.seal_block(100).unwrap();

        let text = render(|out| chain(out, ledger.chain(), ledger.is_valid()));

        assert!(text.contains("Block 1:"));
        assert!(text.contains("- Previous Hash: 1\n"));
        assert!(text.contains("Block 2:"));
        assert!(text.contains("- Proof: 100"));
        assert!(text.contains("  - Sender: A"));
        assert!(text.contains("  - Receiver: B"));
        assert!(text.contains("  - Amount: 2.5 ETH"));
        assert!(text.contains(" UTC"));
        assert!(!text.contains("failed validation"));
        assert_eq!(ledger.chain()[1].transactions, vec![TransactionRecord::new(Address::from("A"), Address::from("B"), 2.5)]);
    }

    #[test]
    fn test_wallet_menu() {
        let wallets = WalletStore::default();
        let ids = vec![Address::from("X1"), Address::from("X2")];

        let text = render(|out| wallet_menu(out, &ids, &wallets));

        assert!(text.contains("1. X1: 0 ETH"));
        assert!(text.contains("2. X2: 0 ETH"));
    }
}
