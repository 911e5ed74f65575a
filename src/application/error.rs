use thiserror::Error;

use crate::domain::{LedgerError, Points};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("User not found: {0}")]
    AccountNotFound(String),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient points for {account}: balance {balance}, required {required}")]
    InsufficientBalance {
        account: String,
        balance: Points,
        required: Points,
    },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    /// Attach an account name to a ledger rule violation.
    pub fn from_ledger(account: &str, err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance { balance, required } => {
                AppError::InsufficientBalance {
                    account: account.to_string(),
                    balance,
                    required,
                }
            }
            LedgerError::NonPositiveAmount(_) | LedgerError::Overflow { .. } => {
                AppError::InvalidAmount(err.to_string())
            }
        }
    }
}
