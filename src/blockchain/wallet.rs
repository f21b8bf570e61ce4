use log::{debug, warn};
use rand::Rng;
use thiserror::Error;

use std::collections::BTreeMap;

use super::transaction::Address;

/// Errors that can occur during wallet operations
#[derive(Debug, Error, PartialEq)]
pub enum WalletError {
    #[error("Sender {0} not found in wallet balances")]
    UnknownSender(Address),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Invalid seed range: [{min}, {max}]")]
    InvalidSeedRange { min: f64, max: f64 },
}

/// Rounds a quantity to two decimal places
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Returns true if `value` is a finite, whole number of cents
pub fn is_whole_cents(value: f64) -> bool {
    value.is_finite() && round_cents(value) == value
}

/// Holds the balance of every known wallet
///
/// Balances never go negative: a transfer that would overdraw the sender
/// is rejected rather than clamped. Every balance and every accepted amount
/// is a whole number of cents, so a transfer moves exactly `amount` out of
/// the sender and into the recipient.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletStore {
    balances: BTreeMap<Address, f64>,
}

impl WalletStore {
    /// Restores a wallet store from previously persisted balances
    ///
    /// Balances are normalized to cents; negative or non-finite entries are
    /// dropped.
    pub fn from_balances(balances: BTreeMap<Address, f64>) -> Self {
        let balances = balances
            .into_iter()
            .filter_map(|(address, balance)| {
                if balance.is_finite() && balance >= 0.0 {
                    Some((address, round_cents(balance)))
                } else {
                    warn!("Dropping invalid balance {} for {}", balance, address);
                    None
                }
            })
            .collect();

        WalletStore { balances }
    }

    /// Gets the balance of a wallet
    ///
    /// Unknown wallets read as zero; no entry is created.
    pub fn get_balance(&self, address: &Address) -> f64 {
        self.balances.get(address).copied().unwrap_or(0.0)
    }

    /// Returns true if the wallet has a balance entry
    pub fn contains(&self, address: &Address) -> bool {
        self.balances.contains_key(address)
    }

    /// Checks if the wallet holds at least `amount`
    pub fn has_sufficient_balance(&self, address: &Address, amount: f64) -> bool {
        self.get_balance(address) >= amount
    }

    /// Validates that `sender` may send `amount`
    ///
    /// This is the single balance rule shared by the wallet store and the
    /// ledger's admission check. Amounts must be non-negative whole cents.
    pub fn check_transfer(&self, sender: &Address, amount: f64) -> Result<(), WalletError> {
        if amount < 0.0 || !is_whole_cents(amount) {
            return Err(WalletError::InvalidAmount(amount));
        }

        if !self.contains(sender) {
            return Err(WalletError::UnknownSender(sender.clone()));
        }

        if !self.has_sufficient_balance(sender, amount) {
            return Err(WalletError::InsufficientFunds {
                required: amount,
                available: self.get_balance(sender),
            });
        }

        Ok(())
    }

    /// Transfers funds between wallets
    ///
    /// Either both the debit and the credit happen or neither does. The
    /// recipient's entry is created on first credit.
    ///
    /// # Arguments
    ///
    /// * `sender` - The wallet to debit
    /// * `recipient` - The wallet to credit
    /// * `amount` - The amount to move, in whole cents
    pub fn transfer(&mut self, sender: &Address, recipient: &Address, amount: f64) -> Result<(), WalletError> {
        self.check_transfer(sender, amount)?;

        // both operands are whole cents, so rounding only strips float noise
        let sender_balance = self.get_balance(sender);
        self.balances.insert(sender.clone(), round_cents(sender_balance - amount));

        let recipient_balance = self.get_balance(recipient);
        self.balances.insert(recipient.clone(), round_cents(recipient_balance + amount));

        debug!("Transferred {} from {} to {}", amount, sender, recipient);
        Ok(())
    }

    /// Seeds wallets that have no balance yet with a random amount
    ///
    /// Each new balance is drawn uniformly from `[min, max]` and rounded to
    /// two decimal places. Existing balances are never overwritten. The
    /// range must be finite with `0 <= min <= max`.
    pub fn seed_random<R: Rng + ?Sized>(
        &mut self,
        addresses: &[Address],
        min: f64,
        max: f64,
        rng: &mut R,
    ) -> Result<(), WalletError> {
        if !(min.is_finite() && max.is_finite() && 0.0 <= min && min <= max) {
            return Err(WalletError::InvalidSeedRange { min, max });
        }

        for address in addresses {
            if self.balances.contains_key(address) {
                continue;
            }

            let balance = round_cents(rng.gen_range(min..=max));
            debug!("Seeded {} with {}", address, balance);
            self.balances.insert(address.clone(), balance);
        }

        Ok(())
    }

    /// Gets all balances in address order
    pub fn balances(&self) -> &BTreeMap<Address, f64> {
        &self.balances
    }

    /// Sum of every balance in the store
    pub fn total(&self) -> f64 {
        self.balances.values().sum()
    }
}
