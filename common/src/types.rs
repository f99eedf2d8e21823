use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tipo de movimiento sobre una cuenta.
///
/// En el protocolo viaja como string (`"debit"` / `"credit"`), por lo que
/// la conversion en ambos sentidos vive aqui.
///
/// # Examples
/// ```
/// use common::types::TransactionKind;
///
/// let kind: TransactionKind = "debit".parse().unwrap();
/// assert_eq!(kind.as_str(), "debit");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Debit,
    Credit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Debit => "debit",
            TransactionKind::Credit => "credit",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid transaction type: {0}")]
pub struct InvalidTransactionKind(pub String);

impl FromStr for TransactionKind {
    type Err = InvalidTransactionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(TransactionKind::Debit),
            "credit" => Ok(TransactionKind::Credit),
            other => Err(InvalidTransactionKind(other.to_string())),
        }
    }
}

/// Estado final de un pago visto desde el gateway.
///
/// `Completed` y `Failed` son estados limpios (ambos bancos movieron fondos,
/// o ninguno). `Error` es el estado critico: el emisor confirmo el commit
/// pero el receptor no, y hace falta conciliacion externa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Failed,
    Error,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Error => "error",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_kind_round_trip() {
        assert_eq!("debit".parse::<TransactionKind>().unwrap(), TransactionKind::Debit);
        assert_eq!("credit".parse::<TransactionKind>().unwrap(), TransactionKind::Credit);
        assert_eq!(TransactionKind::Credit.to_string(), "credit");
    }

    #[test]
    fn test_transaction_kind_rejects_unknown() {
        let err = "transfer".parse::<TransactionKind>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid transaction type: transfer");
    }

    #[test]
    fn test_payment_status_as_str() {
        assert_eq!(PaymentStatus::Completed.as_str(), "completed");
        assert_eq!(PaymentStatus::Failed.as_str(), "failed");
        assert_eq!(PaymentStatus::Error.as_str(), "error");
    }
}
