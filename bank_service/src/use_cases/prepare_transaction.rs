use crate::domain::entities::{PrepareVote, PreparedTransaction};
use crate::domain::error::BankError;
use crate::domain::repository::AccountRepository;
use crate::infrastructure::prepared_store::PreparedTransactionStore;
use chrono::Utc;
use common::types::TransactionKind;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

const READY_MESSAGE: &str = "Ready to process transaction";

#[derive(Debug, Clone)]
pub struct PrepareCommand {
    pub transaction_id: String,
    pub account_id: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub counterparty: String,
}

/// Fase 1 del 2PC del lado participante.
///
/// Votar YES no reserva fondos: solo registra la intencion. El chequeo de
/// saldo aqui es consultivo; el que manda es la re-verificacion atomica en
/// el commit. Un Prepare repetido con el mismo id devuelve el voto
/// almacenado tal cual (prepare es idempotente), y los votos NO no dejan
/// entrada en la tabla.
pub struct PrepareTransactionUseCase {
    accounts: Arc<dyn AccountRepository>,
    prepared: Arc<PreparedTransactionStore>,
}

impl PrepareTransactionUseCase {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        prepared: Arc<PreparedTransactionStore>,
    ) -> Self {
        Self { accounts, prepared }
    }

    pub async fn execute(&self, cmd: PrepareCommand) -> Result<PrepareVote, BankError> {
        info!(
            "Prepare transaction request: id={}, account={}, type={}, amount={}",
            cmd.transaction_id, cmd.account_id, cmd.kind, cmd.amount
        );

        if let Some(existing) = self.prepared.get(&cmd.transaction_id).await {
            info!("Transaction already prepared: {}", cmd.transaction_id);
            return Ok(PrepareVote {
                ready: existing.ready,
                message: existing.message,
            });
        }

        let account = match self.accounts.find_by_account_id(&cmd.account_id).await? {
            Some(account) => account,
            None => {
                warn!(
                    "Account {} not found for prepare transaction",
                    cmd.account_id
                );
                return Ok(PrepareVote::no(format!(
                    "Account {} not found",
                    cmd.account_id
                )));
            }
        };

        if cmd.kind == TransactionKind::Debit && account.balance < cmd.amount {
            warn!(
                "Insufficient funds for transaction {}: balance={}, amount={}",
                cmd.transaction_id, account.balance, cmd.amount
            );
            return Ok(PrepareVote::no(format!(
                "Insufficient funds. Current balance: {}, required: {}",
                account.balance, cmd.amount
            )));
        }

        self.prepared
            .insert(PreparedTransaction {
                transaction_id: cmd.transaction_id.clone(),
                account_id: cmd.account_id,
                username: account.username,
                kind: cmd.kind,
                amount: cmd.amount,
                counterparty: cmd.counterparty,
                prepared_at: Utc::now(),
                ready: true,
                message: READY_MESSAGE.to_string(),
            })
            .await;

        info!("Transaction {} prepared successfully", cmd.transaction_id);
        Ok(PrepareVote::yes(READY_MESSAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Account;
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub AccountRepositoryImpl {}

        #[async_trait]
        impl AccountRepository for AccountRepositoryImpl {
            async fn find_by_username(&self, username: &str) -> Result<Option<Account>, BankError>;
            async fn find_by_account_id(&self, account_id: &str) -> Result<Option<Account>, BankError>;
            async fn apply_delta(&self, account_id: &str, delta: Decimal) -> Result<Decimal, BankError>;
        }
    }

    fn account_with_balance(balance: i64) -> Account {
        Account::new("ACC001", "user1", "pass1", "User 1", Decimal::from(balance))
    }

    fn debit_command(amount: i64) -> PrepareCommand {
        PrepareCommand {
            transaction_id: "gtx-sender-p1".to_string(),
            account_id: "ACC001".to_string(),
            kind: TransactionKind::Debit,
            amount: Decimal::from(amount),
            counterparty: "Bank2/ACC002".to_string(),
        }
    }

    #[tokio::test]
    async fn test_debit_with_funds_votes_yes_and_stores_entry() {
        let mut mock_repo = MockAccountRepositoryImpl::new();
        mock_repo
            .expect_find_by_account_id()
            .returning(|_| Ok(Some(account_with_balance(1000))));

        let prepared = Arc::new(PreparedTransactionStore::new());
        let use_case = PrepareTransactionUseCase::new(Arc::new(mock_repo), prepared.clone());

        let vote = use_case.execute(debit_command(150)).await.unwrap();

        assert!(vote.ready);
        assert_eq!(prepared.len().await, 1);
        let stored = prepared.get("gtx-sender-p1").await.unwrap();
        assert_eq!(stored.username, "user1");
        assert_eq!(stored.amount, Decimal::from(150));
    }

    #[tokio::test]
    async fn test_debit_without_funds_votes_no_without_entry() {
        let mut mock_repo = MockAccountRepositoryImpl::new();
        mock_repo
            .expect_find_by_account_id()
            .returning(|_| Ok(Some(account_with_balance(100))));

        let prepared = Arc::new(PreparedTransactionStore::new());
        let use_case = PrepareTransactionUseCase::new(Arc::new(mock_repo), prepared.clone());

        let vote = use_case.execute(debit_command(10000)).await.unwrap();

        assert!(!vote.ready);
        assert!(vote.message.contains("Insufficient funds"));
        assert_eq!(prepared.len().await, 0);
    }

    #[tokio::test]
    async fn test_credit_only_requires_account_exists() {
        let mut mock_repo = MockAccountRepositoryImpl::new();
        mock_repo
            .expect_find_by_account_id()
            .returning(|_| Ok(Some(account_with_balance(0))));

        let prepared = Arc::new(PreparedTransactionStore::new());
        let use_case = PrepareTransactionUseCase::new(Arc::new(mock_repo), prepared.clone());

        let vote = use_case
            .execute(PrepareCommand {
                transaction_id: "gtx-receiver-p1".to_string(),
                account_id: "ACC001".to_string(),
                kind: TransactionKind::Credit,
                amount: Decimal::from(500),
                counterparty: "Bank2/ACC002".to_string(),
            })
            .await
            .unwrap();

        assert!(vote.ready);
    }

    #[tokio::test]
    async fn test_unknown_account_votes_no() {
        let mut mock_repo = MockAccountRepositoryImpl::new();
        mock_repo
            .expect_find_by_account_id()
            .returning(|_| Ok(None));

        let prepared = Arc::new(PreparedTransactionStore::new());
        let use_case = PrepareTransactionUseCase::new(Arc::new(mock_repo), prepared.clone());

        let vote = use_case.execute(debit_command(10)).await.unwrap();

        assert!(!vote.ready);
        assert!(vote.message.contains("not found"));
        assert_eq!(prepared.len().await, 0);
    }

    #[tokio::test]
    async fn test_repeated_prepare_returns_stored_vote_verbatim() {
        let mut mock_repo = MockAccountRepositoryImpl::new();
        // Solo el primer Prepare toca el repositorio
        mock_repo
            .expect_find_by_account_id()
            .times(1)
            .returning(|_| Ok(Some(account_with_balance(1000))));

        let prepared = Arc::new(PreparedTransactionStore::new());
        let use_case = PrepareTransactionUseCase::new(Arc::new(mock_repo), prepared.clone());

        let first = use_case.execute(debit_command(150)).await.unwrap();
        let second = use_case.execute(debit_command(150)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(prepared.len().await, 1);
    }
}
