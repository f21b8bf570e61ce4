use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::transaction::{Address, TransactionRecord};

/// Errors that can occur during persistence operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One entry of the flat transfer history, stored as `[sender, recipient, amount]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry(pub Address, pub Address, pub f64);

impl From<&TransactionRecord> for HistoryEntry {
    fn from(record: &TransactionRecord) -> Self {
        HistoryEntry(record.sender.clone(), record.recipient.clone(), record.amount)
    }
}

/// Everything the simulator writes to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Balance of every known wallet
    #[serde(default)]
    pub wallet_balances: BTreeMap<Address, f64>,

    /// Every accepted transfer, oldest first
    #[serde(default)]
    pub transactions: Vec<HistoryEntry>,
}

/// JSON file holding the persisted wallet balances and history
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Creates a store backed by the file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        StateStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Gets the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted state
    ///
    /// A missing file is not an error and yields empty state.
    pub fn load(&self) -> Result<PersistedState, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No state file at {}, starting fresh", self.path.display());
                return Ok(PersistedState::default());
            }
            Err(err) => return Err(err.into()),
        };

        let state: PersistedState = serde_json::from_str(&contents)?;
        info!(
            "Loaded {} wallet(s) and {} transaction(s) from {}",
            state.wallet_balances.len(),
            state.transactions.len(),
            self.path.display()
        );

        Ok(state)
    }

    /// Loads the persisted state, falling back to empty state on any error
    pub fn load_or_default(&self) -> PersistedState {
        match self.load() {
            Ok(state) => state,
            Err(err) => {
                warn!("Failed to load state from {}: {}", self.path.display(), err);
                warn!("Starting with empty wallet balances and history");
                PersistedState::default()
            }
        }
    }

    /// Writes the state to disk
    ///
    /// The JSON is written to a sibling temporary file which is synced and
    /// then renamed over the target, so a failed save never truncates the
    /// previous state.
    pub fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        let tmp_path = self.tmp_path();

        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, state)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
