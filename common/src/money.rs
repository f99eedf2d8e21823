use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    Malformed(String),

    #[error("Amount must be greater than zero: {0}")]
    NotPositive(String),
}

/// Parsea un monto recibido por el wire y valida que sea estrictamente
/// positivo. Los montos viajan como strings decimales para conservar la
/// precision de `Decimal` de punta a punta.
///
/// # Examples
/// ```
/// use common::money::parse_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_amount("150.50").unwrap(), Decimal::new(15050, 2));
/// assert!(parse_amount("-3").is_err());
/// ```
pub fn parse_amount(raw: &str) -> Result<Decimal, MoneyError> {
    let amount = parse_decimal(raw)?;
    if amount <= Decimal::ZERO {
        return Err(MoneyError::NotPositive(raw.to_string()));
    }
    Ok(amount)
}

/// Parsea cualquier cantidad decimal (balances, montos historicos).
pub fn parse_decimal(raw: &str) -> Result<Decimal, MoneyError> {
    Decimal::from_str(raw.trim()).map_err(|_| MoneyError::Malformed(raw.to_string()))
}
