use crate::domain::entities::LedgerEntry;
use crate::domain::error::BankError;
use crate::domain::repository::{AccountRepository, LedgerRepository};
use std::sync::Arc;
use tracing::info;

const DEFAULT_HISTORY_LIMIT: usize = 10;

pub struct GetTransactionHistoryUseCase {
    accounts: Arc<dyn AccountRepository>,
    ledger: Arc<dyn LedgerRepository>,
}

impl GetTransactionHistoryUseCase {
    pub fn new(accounts: Arc<dyn AccountRepository>, ledger: Arc<dyn LedgerRepository>) -> Self {
        Self { accounts, ledger }
    }

    /// Movimientos mas recientes primero. Un `limit` de cero toma el
    /// default de 10 entradas.
    pub async fn execute(
        &self,
        account_id: &str,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>, BankError> {
        info!(
            "Transaction history request for account {}, limit {}",
            account_id, limit
        );

        if self
            .accounts
            .find_by_account_id(account_id)
            .await?
            .is_none()
        {
            return Err(BankError::AccountNotFound(account_id.to_string()));
        }

        let limit = if limit == 0 {
            DEFAULT_HISTORY_LIMIT
        } else {
            limit
        };

        self.ledger.recent(account_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Account;
    use async_trait::async_trait;
    use common::types::TransactionKind;
    use mockall::mock;
    use mockall::predicate::*;
    use rust_decimal::Decimal;

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

    fn account() -> Account {
        Account::new("ACC001", "user1", "pass1", "User 1", Decimal::from(1000))
    }

    #[tokio::test]
    async fn test_zero_limit_defaults_to_ten() {
        let mut mock_accounts = MockAccountRepositoryImpl::new();
        mock_accounts
            .expect_find_by_account_id()
            .returning(|_| Ok(Some(account())));

        let mut mock_ledger = MockLedgerRepositoryImpl::new();
        mock_ledger
            .expect_recent()
            .with(eq("ACC001"), eq(10usize))
            .times(1)
            .returning(|_, _| {
                Ok(vec![LedgerEntry::completed(
                    TransactionKind::Credit,
                    Decimal::from(1000),
                    "Bank",
                )])
            });

        let use_case =
            GetTransactionHistoryUseCase::new(Arc::new(mock_accounts), Arc::new(mock_ledger));
        let entries = use_case.execute("ACC001", 0).await.unwrap();

        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_account_is_rejected_without_reading_ledger() {
        let mut mock_accounts = MockAccountRepositoryImpl::new();
        mock_accounts
            .expect_find_by_account_id()
            .returning(|_| Ok(None));

        let mock_ledger = MockLedgerRepositoryImpl::new();

        let use_case =
            GetTransactionHistoryUseCase::new(Arc::new(mock_accounts), Arc::new(mock_ledger));
        let result = use_case.execute("ACC999", 5).await;

        assert_eq!(
            result.unwrap_err(),
            BankError::AccountNotFound("ACC999".to_string())
        );
    }
}
