use crate::domain::entities::Account;
use crate::domain::error::BankError;
use crate::domain::repository::AccountRepository;
use std::sync::Arc;
use tracing::{info, warn};

/// Caso de uso para verificar credenciales en nombre del gateway.
///
/// El gateway nunca guarda passwords: reenvia las credenciales al banco
/// dueño de la cuenta y este responde con el account id si son validas.
pub struct VerifyCredentialsUseCase {
    accounts: Arc<dyn AccountRepository>,
}

impl VerifyCredentialsUseCase {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// Devuelve la cuenta si usuario y password coinciden, `None` si no.
    pub async fn execute(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, BankError> {
        // No se loguea el password
        info!("Credential verification attempt: username={}", username);

        match self.accounts.find_by_username(username).await? {
            Some(account) if account.password == password => {
                info!("Credential verification successful: username={}", username);
                Ok(Some(account))
            }
            _ => {
                warn!("Credential verification failed: username={}", username);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
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

    fn user1() -> Account {
        Account::new("ACC001", "user1", "pass1", "User 1", Decimal::from(1000))
    }

    #[tokio::test]
    async fn test_valid_credentials_return_account() {
        let mut mock_repo = MockAccountRepositoryImpl::new();
        mock_repo
            .expect_find_by_username()
            .with(eq("user1"))
            .times(1)
            .returning(|_| Ok(Some(user1())));

        let use_case = VerifyCredentialsUseCase::new(Arc::new(mock_repo));
        let result = use_case.execute("user1", "pass1").await.unwrap();

        assert_eq!(result.unwrap().account_id, "ACC001");
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let mut mock_repo = MockAccountRepositoryImpl::new();
        mock_repo
            .expect_find_by_username()
            .returning(|_| Ok(Some(user1())));

        let use_case = VerifyCredentialsUseCase::new(Arc::new(mock_repo));
        let result = use_case.execute("user1", "wrong").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_user_is_rejected() {
        let mut mock_repo = MockAccountRepositoryImpl::new();
        mock_repo.expect_find_by_username().returning(|_| Ok(None));

        let use_case = VerifyCredentialsUseCase::new(Arc::new(mock_repo));
        let result = use_case.execute("ghost", "pass").await.unwrap();

        assert!(result.is_none());
    }
}
