use crate::domain::entities::SessionToken;
use crate::infrastructure::bank_directory::BankDirectory;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceOutcome {
    pub success: bool,
    pub balance: Decimal,
    pub message: String,
}

impl BalanceOutcome {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            balance: Decimal::ZERO,
            message,
        }
    }
}

/// Consulta de saldo de la cuenta ligada al token. Si el request trae un
/// account id explicito, debe ser la cuenta propia.
pub struct CheckBalanceUseCase {
    banks: Arc<BankDirectory>,
    call_timeout: Duration,
}

impl CheckBalanceUseCase {
    pub fn new(banks: Arc<BankDirectory>, call_timeout: Duration) -> Self {
        Self {
            banks,
            call_timeout,
        }
    }

    pub async fn execute(&self, session: &SessionToken, requested_account: &str) -> BalanceOutcome {
        if !requested_account.is_empty() && requested_account != session.account_id {
            warn!(
                "User {} tried to view balance of account {}",
                session.username, requested_account
            );
            return BalanceOutcome::failure("Authorization failed: Not your account".to_string());
        }

        let bank = match self.banks.get(&session.bank) {
            Some(bank) => bank,
            None => {
                return BalanceOutcome::failure(format!("Bank {} not found", session.bank));
            }
        };

        match bank
            .get_balance(&session.account_id, self.call_timeout)
            .await
        {
            Ok(reply) => {
                info!(
                    "Balance check for user {} at bank {}",
                    session.username, session.bank
                );
                BalanceOutcome {
                    success: reply.success,
                    balance: reply.balance,
                    message: reply.message,
                }
            }
            Err(e) => {
                error!("Error checking balance: {}", e);
                BalanceOutcome::failure(format!("Failed to get balance: {}", e))
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
    use chrono::{Duration as ChronoDuration, Utc};
    use mockall::mock;
    use std::collections::HashMap;

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

    fn session() -> SessionToken {
        SessionToken {
            token: "user1-abc".to_string(),
            username: "user1".to_string(),
            bank: "Bank1".to_string(),
            account_id: "ACC001".to_string(),
            expires_at: Utc::now() + ChronoDuration::hours(1),
        }
    }

    fn use_case(bank: MockBankGatewayImpl) -> CheckBalanceUseCase {
        let mut banks: HashMap<String, Arc<dyn BankGateway>> = HashMap::new();
        banks.insert("Bank1".to_string(), Arc::new(bank));
        CheckBalanceUseCase::new(Arc::new(BankDirectory::new(banks)), Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_own_balance_passes_through() {
        let mut bank = MockBankGatewayImpl::new();
        bank.expect_get_balance().times(1).returning(|_, _| {
            Ok(BalanceReply {
                success: true,
                balance: Decimal::from(1000),
                message: "Balance retrieved successfully".to_string(),
            })
        });

        let outcome = use_case(bank).execute(&session(), "").await;

        assert!(outcome.success);
        assert_eq!(outcome.balance, Decimal::from(1000));
    }

    #[tokio::test]
    async fn test_foreign_account_is_denied_without_rpc() {
        let bank = MockBankGatewayImpl::new();

        let outcome = use_case(bank).execute(&session(), "ACC002").await;

        assert!(!outcome.success);
        assert_eq!(outcome.message, "Authorization failed: Not your account");
    }

    #[tokio::test]
    async fn test_transport_error_is_reported() {
        let mut bank = MockBankGatewayImpl::new();
        bank.expect_get_balance()
            .returning(|_, _| Err(BankCallError::DeadlineExceeded));

        let outcome = use_case(bank).execute(&session(), "ACC001").await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("Failed to get balance"));
    }
}
