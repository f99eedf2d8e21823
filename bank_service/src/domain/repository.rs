use crate::domain::entities::{Account, LedgerEntry};
use crate::domain::error::BankError;
use async_trait::async_trait;
use rust_decimal::Decimal;

// Port for Account Persistence
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, BankError>;

    async fn find_by_account_id(&self, account_id: &str) -> Result<Option<Account>, BankError>;

    /// Aplica un delta (positivo = credito, negativo = debito) de forma
    /// atomica y devuelve el nuevo balance. La implementacion re-verifica
    /// los fondos bajo su propio lock: es el punto que impide que dos
    /// commits concurrentes sobregiren la cuenta.
    async fn apply_delta(&self, account_id: &str, delta: Decimal) -> Result<Decimal, BankError>;
}

// Port for Ledger Persistence
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn append(&self, account_id: &str, entry: LedgerEntry) -> Result<(), BankError>;

    /// Entradas mas recientes primero, hasta `limit`.
    async fn recent(&self, account_id: &str, limit: usize) -> Result<Vec<LedgerEntry>, BankError>;
}
