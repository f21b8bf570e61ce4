// Blockchain module
//
// This module contains the ledger core:
// - Block and transaction records
// - Canonical hashing of blocks
// - Wallet balances
// - The chain with its pending buffer
// - JSON persistence of balances and history

pub mod block;
pub mod chain;
pub mod hashing;
pub mod storage;
pub mod transaction;
pub mod wallet;

// Re-export main components for easier access
pub use block::Block;
pub use chain::{Ledger, LedgerError};
pub use storage::{HistoryEntry, PersistedState, StateStore};
pub use transaction::Address;
pub use wallet::{WalletError, WalletStore};
