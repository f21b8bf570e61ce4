use std::fmt;
use std::str::FromStr;

use crate::blockchain::wallet::round_cents;

/// Options offered by the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Simulate,
    ShowBalances,
    ShowChain,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(MenuChoice::Simulate),
            "2" => Ok(MenuChoice::ShowBalances),
            "3" => Ok(MenuChoice::ShowChain),
            "4" => Ok(MenuChoice::Exit),
            _ => Err("Invalid choice. Please select a valid option (1/2/3/4).".to_string()),
        }
    }
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuChoice::Simulate => write!(f, "1. Simulate Ethereal Transactions"),
            MenuChoice::ShowBalances => write!(f, "2. Display Wallet Balances and Transactions"),
            MenuChoice::ShowChain => write!(f, "3. Display Blockchain"),
            MenuChoice::Exit => write!(f, "4. Exit"),
        }
    }
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 4] = [
        MenuChoice::Simulate,
        MenuChoice::ShowBalances,
        MenuChoice::ShowChain,
        MenuChoice::Exit,
    ];
}

/// Parses a non-negative transaction count
pub fn parse_count(input: &str) -> Result<usize, String> {
    input
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("Invalid number of transactions: {:?}", input.trim()))
}

/// Parses a 1-based wallet number into a 0-based index
pub fn parse_wallet_index(input: &str, wallet_count: usize) -> Result<usize, String> {
    let out_of_range = || format!("Invalid wallet selection. Choose a number from 1 to {}.", wallet_count);

    match input.trim().parse::<usize>() {
        Ok(number) if (1..=wallet_count).contains(&number) => Ok(number - 1),
        _ => Err(out_of_range()),
    }
}

/// Parses an amount and rounds it to two decimal places
pub fn parse_amount(input: &str) -> Result<f64, String> {
    let amount: f64 = input
        .trim()
        .parse()
        .map_err(|_| format!("Invalid amount: {:?}", input.trim()))?;

    if !amount.is_finite() || amount < 0.0 {
        return Err(format!("Invalid amount: {}. Amount must be a non-negative number.", amount));
    }

    Ok(round_cents(amount))
}
