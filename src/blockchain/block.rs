use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transaction::TransactionRecord;

/// Previous-hash sentinel carried by the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Placeholder proof stamped on the genesis block
pub const GENESIS_PROOF: u64 = 100;

/// Represents a sealed block in the chain
///
/// Blocks are immutable once appended; the ledger only ever hands out
/// shared references or clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position of the block in the chain
    pub index: u64,

    /// Time at which the block was sealed
    pub timestamp: DateTime<Utc>,

    /// Transactions frozen into this block
    pub transactions: Vec<TransactionRecord>,

    /// Placeholder proof, never searched for
    pub proof: u64,

    /// Digest of the preceding block, or the genesis sentinel
    pub previous_hash: String,
}

impl Block {
    /// Creates a new block sealed at the current time
    ///
    /// # Arguments
    ///
    /// * `index` - The 1-based index of the block in the chain
    /// * `transactions` - The batch of transactions to freeze into the block
    /// * `proof` - The placeholder proof value
    /// * `previous_hash` - The digest of the previous block
    pub fn new(index: u64, transactions: Vec<TransactionRecord>, proof: u64, previous_hash: String) -> Self {
        Block {
            index,
            timestamp: Utc::now(),
            transactions,
            proof,
            previous_hash,
        }
    }

    /// Creates the genesis block
    pub fn genesis() -> Self {
        Block::new(1, Vec::new(), GENESIS_PROOF, GENESIS_PREVIOUS_HASH.to_string())
    }

    /// Returns true if this block carries the genesis sentinel
    pub fn is_genesis(&self) -> bool {
        self.index == 1 && self.previous_hash == GENESIS_PREVIOUS_HASH
    }
}
