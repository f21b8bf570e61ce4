use serde::{Deserialize, Serialize};

use std::fmt;

/// Identifies a wallet in the ledger
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Address(value.to_string())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Address(value)
    }
}

/// A transfer between two wallets
///
/// Records live in the ledger's pending buffer until a block is sealed,
/// after which they belong to exactly one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Sender's address
    pub sender: Address,

    /// Recipient's address
    pub recipient: Address,

    /// Amount being transferred
    pub amount: f64,
}

impl TransactionRecord {
    /// Creates a new transaction record
    pub fn new(sender: Address, recipient: Address, amount: f64) -> Self {
        TransactionRecord {
            sender,
            recipient,
            amount,
        }
    }
}
