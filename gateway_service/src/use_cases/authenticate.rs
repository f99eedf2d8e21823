use crate::infrastructure::bank_directory::BankDirectory;
use crate::infrastructure::token_store::TokenStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub success: bool,
    pub token: String,
    pub message: String,
}

impl AuthOutcome {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            token: String::new(),
            message,
        }
    }
}

/// Autenticacion contra el banco dueño de la cuenta.
///
/// El gateway no conoce passwords: reenvia las credenciales via
/// `VerifyCredentials` y, si el banco las da por buenas, emite y persiste
/// un token de sesion de una hora.
pub struct AuthenticateUseCase {
    banks: Arc<BankDirectory>,
    tokens: Arc<TokenStore>,
    call_timeout: Duration,
}

impl AuthenticateUseCase {
    pub fn new(banks: Arc<BankDirectory>, tokens: Arc<TokenStore>, call_timeout: Duration) -> Self {
        Self {
            banks,
            tokens,
            call_timeout,
        }
    }

    pub async fn execute(&self, username: &str, password: &str, bank_name: &str) -> AuthOutcome {
        info!(
            "Authentication attempt: username={}, bank={}",
            username, bank_name
        );

        let bank = match self.banks.get(bank_name) {
            Some(bank) => bank,
            None => {
                let message = format!("Bank {} not found or connection failed", bank_name);
                warn!("Authentication failed: {}", message);
                return AuthOutcome::failure(message);
            }
        };

        let check = match bank
            .verify_credentials(username, password, self.call_timeout)
            .await
        {
            Ok(check) => check,
            Err(e) => {
                error!("Bank communication error during authentication: {}", e);
                return AuthOutcome::failure(format!("Authentication failed: {}", e));
            }
        };

        if !check.valid {
            warn!(
                "Authentication failed: username={}, bank={}, reason={}",
                username, bank_name, check.message
            );
            return AuthOutcome::failure(check.message);
        }

        match self.tokens.mint(username, bank_name, &check.account_id) {
            Ok(session) => {
                info!(
                    "Authentication successful: username={}, bank={}",
                    username, bank_name
                );
                AuthOutcome {
                    success: true,
                    token: session.token,
                    message: "Authentication successful".to_string(),
                }
            }
            Err(e) => {
                error!("Failed to persist session token: {}", e);
                AuthOutcome::failure(format!("Authentication failed: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        BalanceReply, CommitAck, CredentialCheck, HistoryReply, ParticipantPrepare, PrepareVote,
    };
    use crate::domain::gateways::{BankCallError, BankGateway};
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use mockall::mock;
    use mockall::predicate::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    mock! {
        pub BankGatewayImpl {}

        #[async_trait]
        impl BankGateway for BankGatewayImpl {
            async fn verify_credentials(&self, username: &str, password: &str, timeout: Duration) -> Result<CredentialCheck, BankCallError>;
            async fn get_balance(&self, account_id: &str, timeout: Duration) -> Result<BalanceReply, BankCallError>;
            async fn get_transaction_history(&self, account_id: &str, limit: u32, timeout: Duration) -> Result<HistoryReply, BankCallError>;
            async fn prepare_transaction(&self, prepare: ParticipantPrepare, timeout: Duration) -> Result<PrepareVote, BankCallError>;
            async fn commit_transaction(&self, transaction_id: &str, timeout: Duration) -> Result<CommitAck, BankCallError>;
            async fn abort_transaction(&self, transaction_id: &str, timeout: Duration) -> Result<(), BankCallError>;
        }
    }

    fn fixture(bank: MockBankGatewayImpl) -> (AuthenticateUseCase, Arc<TokenStore>) {
        let mut banks: HashMap<String, Arc<dyn BankGateway>> = HashMap::new();
        banks.insert("Bank1".to_string(), Arc::new(bank));

        let dir = tempdir().unwrap();
        let tokens = Arc::new(
            TokenStore::load(
                dir.path().join("active_tokens.json"),
                ChronoDuration::hours(1),
            )
            .unwrap(),
        );
        std::mem::forget(dir);

        (
            AuthenticateUseCase::new(
                Arc::new(BankDirectory::new(banks)),
                tokens.clone(),
                Duration::from_secs(10),
            ),
            tokens,
        )
    }

    #[tokio::test]
    async fn test_valid_credentials_mint_usable_token() {
        let mut bank = MockBankGatewayImpl::new();
        bank.expect_verify_credentials()
            .with(eq("user1"), eq("pass1"), always())
            .times(1)
            .returning(|_, _, _| {
                Ok(CredentialCheck {
                    valid: true,
                    account_id: "ACC001".to_string(),
                    message: "Credentials verified successfully".to_string(),
                })
            });

        let (use_case, tokens) = fixture(bank);
        let outcome = use_case.execute("user1", "pass1", "Bank1").await;

        assert!(outcome.success);
        let session = tokens.validate(&outcome.token).unwrap();
        assert_eq!(session.account_id, "ACC001");
        assert_eq!(session.bank, "Bank1");
    }

    #[tokio::test]
    async fn test_invalid_credentials_do_not_mint_token() {
        let mut bank = MockBankGatewayImpl::new();
        bank.expect_verify_credentials().returning(|_, _, _| {
            Ok(CredentialCheck {
                valid: false,
                account_id: String::new(),
                message: "Invalid username or password".to_string(),
            })
        });

        let (use_case, _) = fixture(bank);
        let outcome = use_case.execute("user1", "wrong", "Bank1").await;

        assert!(!outcome.success);
        assert!(outcome.token.is_empty());
        assert_eq!(outcome.message, "Invalid username or password");
    }

    #[tokio::test]
    async fn test_unknown_bank_is_rejected_without_rpc() {
        let bank = MockBankGatewayImpl::new();
        let (use_case, _) = fixture(bank);

        let outcome = use_case.execute("user1", "pass1", "BankZ").await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("BankZ not found"));
    }

    #[tokio::test]
    async fn test_bank_unreachable_surfaces_failure() {
        let mut bank = MockBankGatewayImpl::new();
        bank.expect_verify_credentials()
            .returning(|_, _, _| Err(BankCallError::Unavailable("refused".to_string())));

        let (use_case, _) = fixture(bank);
        let outcome = use_case.execute("user1", "pass1", "Bank1").await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("Authentication failed"));
    }
}
