use crate::domain::entities::LedgerEntry;
use crate::domain::error::BankError;
use crate::domain::repository::{AccountRepository, LedgerRepository};
use crate::infrastructure::persistence::processed_cache::{
    ProcessedResult, ProcessedTransactionCache,
};
use common::types::TransactionKind;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct DirectTransactionCommand {
    pub account_id: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub counterparty: String,
    pub payment_id: Option<String>,
}

/// Camino directo (no 2PC): un debito o credito contra una sola cuenta,
/// idempotente via el cache de transacciones procesadas.
///
/// El resultado, exito o fallo de negocio, se cachea bajo el payment id
/// para que un reintento del gateway devuelva exactamente lo mismo sin
/// volver a mover fondos.
pub struct ProcessTransactionUseCase {
    accounts: Arc<dyn AccountRepository>,
    ledger: Arc<dyn LedgerRepository>,
    processed: Arc<ProcessedTransactionCache>,
}

impl ProcessTransactionUseCase {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        ledger: Arc<dyn LedgerRepository>,
        processed: Arc<ProcessedTransactionCache>,
    ) -> Self {
        Self {
            accounts,
            ledger,
            processed,
        }
    }

    pub async fn execute(
        &self,
        cmd: DirectTransactionCommand,
    ) -> Result<ProcessedResult, BankError> {
        info!(
            "Transaction request: account={}, type={}, amount={}",
            cmd.account_id, cmd.kind, cmd.amount
        );

        if let Some(payment_id) = &cmd.payment_id {
            if let Some(cached) = self.processed.get(payment_id).await {
                info!(
                    "Returning cached result for idempotent transaction: {}",
                    payment_id
                );
                return Ok(cached);
            }
        }

        let result = self.apply(&cmd).await?;

        if let Some(payment_id) = &cmd.payment_id {
            self.processed.put(payment_id, result.clone()).await?;
        }

        Ok(result)
    }

    async fn apply(&self, cmd: &DirectTransactionCommand) -> Result<ProcessedResult, BankError> {
        let account = match self.accounts.find_by_account_id(&cmd.account_id).await? {
            Some(account) => account,
            None => {
                return Ok(ProcessedResult {
                    success: false,
                    message: format!("Account {} not found", cmd.account_id),
                });
            }
        };

        let delta = match cmd.kind {
            TransactionKind::Debit => {
                if account.balance < cmd.amount {
                    return Ok(ProcessedResult {
                        success: false,
                        message: format!(
                            "Insufficient funds. Current balance: {}",
                            account.balance
                        ),
                    });
                }
                -cmd.amount
            }
            TransactionKind::Credit => cmd.amount,
        };

        let new_balance = match self.accounts.apply_delta(&cmd.account_id, delta).await {
            Ok(balance) => balance,
            // Otro request pudo ganar la carrera entre el chequeo y el delta
            Err(BankError::InsufficientFunds { balance, .. }) => {
                return Ok(ProcessedResult {
                    success: false,
                    message: format!("Insufficient funds. Current balance: {}", balance),
                });
            }
            Err(e) => return Err(e),
        };

        self.ledger
            .append(
                &cmd.account_id,
                LedgerEntry::completed(cmd.kind, cmd.amount, &cmd.counterparty),
            )
            .await?;

        let verb = match cmd.kind {
            TransactionKind::Debit => "Debit",
            TransactionKind::Credit => "Credit",
        };
        Ok(ProcessedResult {
            success: true,
            message: format!("{} successful. New balance: {}", verb, new_balance),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Account;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::*;
    use tempfile::tempdir;

    mock! {
        pub AccountRepositoryImpl {}

        #[async_trait]
        impl AccountRepository for AccountRepositoryImpl {
            async fn find_by_username(&self, username: &str) -> Result<Option<Account>, BankError>;
            async fn find_by_account_id(&self, account_id: &str) -> Result<Option<Account>, BankError>;
            async fn apply_delta(&self, account_id: &str, delta: Decimal) -> Result<Decimal, BankError>;
        }
    }

    mock! {
        pub LedgerRepositoryImpl {}

        #[async_trait]
        impl LedgerRepository for LedgerRepositoryImpl {
            async fn append(&self, account_id: &str, entry: LedgerEntry) -> Result<(), BankError>;
            async fn recent(&self, account_id: &str, limit: usize) -> Result<Vec<LedgerEntry>, BankError>;
        }
    }

    fn cache() -> Arc<ProcessedTransactionCache> {
        let dir = tempdir().unwrap();
        let cache = ProcessedTransactionCache::load(dir.path(), "Bank1").unwrap();
        // El tempdir vive mientras viva el proceso de test
        std::mem::forget(dir);
        Arc::new(cache)
    }

    fn account() -> Account {
        Account::new("ACC001", "user1", "pass1", "User 1", Decimal::from(1000))
    }

    fn debit(amount: i64, payment_id: Option<&str>) -> DirectTransactionCommand {
        DirectTransactionCommand {
            account_id: "ACC001".to_string(),
            kind: TransactionKind::Debit,
            amount: Decimal::from(amount),
            counterparty: "Bank2/ACC002".to_string(),
            payment_id: payment_id.map(|s| s.to_string()),
        }
    }

    #[tokio::test]
    async fn test_debit_success_updates_balance_and_ledger() {
        let mut mock_accounts = MockAccountRepositoryImpl::new();
        mock_accounts
            .expect_find_by_account_id()
            .returning(|_| Ok(Some(account())));
        mock_accounts
            .expect_apply_delta()
            .with(eq("ACC001"), eq(Decimal::from(-100)))
            .times(1)
            .returning(|_, _| Ok(Decimal::from(900)));

        let mut mock_ledger = MockLedgerRepositoryImpl::new();
        mock_ledger
            .expect_append()
            .withf(|_, entry: &LedgerEntry| {
                entry.kind == TransactionKind::Debit && entry.amount == Decimal::from(100)
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let use_case = ProcessTransactionUseCase::new(
            Arc::new(mock_accounts),
            Arc::new(mock_ledger),
            cache(),
        );

        let result = use_case.execute(debit(100, None)).await.unwrap();

        assert!(result.success);
        assert_eq!(result.message, "Debit successful. New balance: 900");
    }

    #[tokio::test]
    async fn test_repeated_payment_id_replays_cached_result() {
        let mut mock_accounts = MockAccountRepositoryImpl::new();
        // Solo la primera ejecucion toca las cuentas
        mock_accounts
            .expect_find_by_account_id()
            .times(1)
            .returning(|_| Ok(Some(account())));
        mock_accounts
            .expect_apply_delta()
            .times(1)
            .returning(|_, _| Ok(Decimal::from(900)));

        let mut mock_ledger = MockLedgerRepositoryImpl::new();
        mock_ledger.expect_append().times(1).returning(|_, _| Ok(()));

        let use_case = ProcessTransactionUseCase::new(
            Arc::new(mock_accounts),
            Arc::new(mock_ledger),
            cache(),
        );

        let first = use_case.execute(debit(100, Some("p-1"))).await.unwrap();
        let second = use_case.execute(debit(100, Some("p-1"))).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_insufficient_funds_is_cached_failure() {
        let mut mock_accounts = MockAccountRepositoryImpl::new();
        mock_accounts
            .expect_find_by_account_id()
            .times(1)
            .returning(|_| Ok(Some(account())));

        let mock_ledger = MockLedgerRepositoryImpl::new();

        let use_case = ProcessTransactionUseCase::new(
            Arc::new(mock_accounts),
            Arc::new(mock_ledger),
            cache(),
        );

        let first = use_case.execute(debit(5000, Some("p-2"))).await.unwrap();
        assert!(!first.success);
        assert!(first.message.contains("Insufficient funds"));

        // El reintento sale del cache sin tocar el repositorio
        let second = use_case.execute(debit(5000, Some("p-2"))).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_account_fails() {
        let mut mock_accounts = MockAccountRepositoryImpl::new();
        mock_accounts
            .expect_find_by_account_id()
            .returning(|_| Ok(None));

        let mock_ledger = MockLedgerRepositoryImpl::new();

        let use_case = ProcessTransactionUseCase::new(
            Arc::new(mock_accounts),
            Arc::new(mock_ledger),
            cache(),
        );

        let result = use_case.execute(debit(10, None)).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.message, "Account ACC001 not found");
    }
}
