use crate::domain::error::BankError;
use crate::domain::repository::AccountRepository;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

pub struct GetBalanceUseCase {
    accounts: Arc<dyn AccountRepository>,
}

impl GetBalanceUseCase {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    pub async fn execute(&self, account_id: &str) -> Result<Decimal, BankError> {
        info!("Balance check for account {}", account_id);

        let account = self
            .accounts
            .find_by_account_id(account_id)
            .await?
            .ok_or_else(|| BankError::AccountNotFound(account_id.to_string()))?;

        Ok(account.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Account;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::*;

    mock! {
        pub AccountRepositoryImpl {}

        #[async_trait]
        impl AccountRepository for AccountRepositoryImpl {
            async fn find_by_username(&self, username: &str) -> Result<Option<Account>, BankError>;
            async fn find_by_account_id(&self, account_id: &str) -> Result<Option<Account>, BankError>;
            async fn apply_delta(&self, account_id: &str, delta: Decimal) -> Result<Decimal, BankError>;
        }
    }

    #[tokio::test]
    async fn test_returns_balance_for_existing_account() {
        let mut mock_repo = MockAccountRepositoryImpl::new();
        mock_repo
            .expect_find_by_account_id()
            .with(eq("ACC002"))
            .times(1)
            .returning(|_| {
                Ok(Some(Account::new(
                    "ACC002",
                    "user2",
                    "pass2",
                    "User 2",
                    Decimal::from(2000),
                )))
            });

        let use_case = GetBalanceUseCase::new(Arc::new(mock_repo));
        let balance = use_case.execute("ACC002").await.unwrap();

        assert_eq!(balance, Decimal::from(2000));
    }

    #[tokio::test]
    async fn test_unknown_account_is_not_found() {
        let mut mock_repo = MockAccountRepositoryImpl::new();
        mock_repo
            .expect_find_by_account_id()
            .returning(|_| Ok(None));

        let use_case = GetBalanceUseCase::new(Arc::new(mock_repo));
        let result = use_case.execute("ACC999").await;

        assert_eq!(
            result.unwrap_err(),
            BankError::AccountNotFound("ACC999".to_string())
        );
    }
}
