use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BankError {
    #[error("Account {0} not found")]
    AccountNotFound(String),

    #[error("Insufficient funds. Current balance: {balance}")]
    InsufficientFunds {
        account_id: String,
        balance: Decimal,
    },

    #[error("Storage error: {0}")]
    StorageError(String),
}
