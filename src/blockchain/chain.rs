use log::{info, warn};
use thiserror::Error;

use super::block::Block;
use super::hashing;
use super::transaction::{Address, TransactionRecord};
use super::wallet::{WalletError, WalletStore};

/// Errors that can occur during ledger operations
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Ledger has no blocks")]
    EmptyChain,
}

/// The append-only chain of sealed blocks plus the pending buffer
#[derive(Debug, Clone)]
pub struct Ledger {
    /// The chain of blocks
    chain: Vec<Block>,

    /// Transactions waiting to be sealed into the next block
    pending: Vec<TransactionRecord>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Creates a new ledger with its genesis block already sealed
    pub fn new() -> Self {
        let mut ledger = Ledger {
            chain: Vec::new(),
            pending: Vec::new(),
        };

        ledger.create_genesis_block();

        ledger
    }

    fn create_genesis_block(&mut self) {
        self.chain.push(Block::genesis());
    }

    /// Gets the last block in the chain
    pub fn last_block(&self) -> Result<&Block, LedgerError> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Index the next sealed block will carry
    fn next_index(&self) -> u64 {
        self.chain.len() as u64 + 1
    }

    /// Adds a transaction to the pending buffer
    ///
    /// The sender must already hold at least `amount`; this is the same rule
    /// the wallet store enforces on transfer. Balances are not modified here.
    ///
    /// # Returns
    ///
    /// The index of the block that will hold this transaction once sealed
    pub fn admit_transaction(
        &mut self,
        wallets: &WalletStore,
        sender: &Address,
        recipient: &Address,
        amount: f64,
    ) -> Result<u64, LedgerError> {
        if let Err(err) = wallets.check_transfer(sender, amount) {
            warn!("Rejected transaction from {}: {}", sender, err);
            return Err(err.into());
        }

        Ok(self.push_pending(sender, recipient, amount))
    }

    /// Moves funds between wallets and records the transfer as pending
    ///
    /// Admission runs against the balances as they were before the debit, so
    /// a rejected transfer leaves both the wallet store and the pending
    /// buffer untouched.
    ///
    /// # Returns
    ///
    /// The index of the block that will hold this transaction once sealed
    pub fn submit_transfer(
        &mut self,
        wallets: &mut WalletStore,
        sender: &Address,
        recipient: &Address,
        amount: f64,
    ) -> Result<u64, LedgerError> {
        let block_index = self.admit_transaction(wallets, sender, recipient, amount)?;

        if let Err(err) = wallets.transfer(sender, recipient, amount) {
            self.pending.pop();
            warn!("Rolled back transaction from {}: {}", sender, err);
            return Err(err.into());
        }

        Ok(block_index)
    }

    fn push_pending(&mut self, sender: &Address, recipient: &Address, amount: f64) -> u64 {
        self.pending
            .push(TransactionRecord::new(sender.clone(), recipient.clone(), amount));

        // the last block always exists, so this is its index + 1
        self.next_index()
    }

    /// Seals the pending transactions into a new block
    ///
    /// Sealing an empty buffer is legal and yields a block with no
    /// transactions.
    ///
    /// # Arguments
    ///
    /// * `proof` - The placeholder proof to stamp on the block
    ///
    /// # Returns
    ///
    /// The newly sealed block
    pub fn seal_block(&mut self, proof: u64) -> Result<&Block, LedgerError> {
        let previous_hash = hashing::digest(self.last_block()?);
        let transactions = std::mem::take(&mut self.pending);

        let block = Block::new(self.next_index(), transactions, proof, previous_hash);
        info!(
            "Sealed block {} with {} transaction(s)",
            block.index,
            block.transactions.len()
        );

        self.chain.push(block);
        self.last_block()
    }

    /// Gets the entire chain
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Gets the transactions waiting to be sealed
    pub fn pending(&self) -> &[TransactionRecord] {
        &self.pending
    }

    /// Validates the chain
    ///
    /// # Returns
    ///
    /// true if the genesis block carries the sentinel, indices run 1, 2, 3...
    /// and every block's previous hash matches the digest of its predecessor
    pub fn is_valid(&self) -> bool {
        match self.chain.first() {
            Some(genesis) if genesis.is_genesis() => {}
            _ => return false,
        }

        for i in 1..self.chain.len() {
            let current_block = &self.chain[i];
            let previous_block = &self.chain[i - 1];

            if current_block.index != previous_block.index + 1 {
                return false;
            }

            if current_block.previous_hash != hashing::digest(previous_block) {
                return false;
            }
        }

        true
    }
}
