use crate::domain::entities::{
    BalanceReply, CommitAck, CredentialCheck, HistoryReply, ParticipantPrepare, PrepareVote,
};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Fallos de transporte al llamar a un banco. Los rechazos de negocio
/// (voto NO, cuenta inexistente) NO pasan por aqui: llegan como respuestas
/// estructuradas dentro del `Ok`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BankCallError {
    #[error("Bank unavailable: {0}")]
    Unavailable(String),

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Bank communication error: {0}")]
    Rpc(String),
}

/// Port hacia un banco participante. Cada llamada recibe su presupuesto de
/// tiempo explicito: el coordinador 2PC calcula cuanto le queda de la fase
/// y los aborts usan siempre el timeout corto fijo.
#[async_trait]
pub trait BankGateway: Send + Sync {
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<CredentialCheck, BankCallError>;

    async fn get_balance(
        &self,
        account_id: &str,
        timeout: Duration,
    ) -> Result<BalanceReply, BankCallError>;

    async fn get_transaction_history(
        &self,
        account_id: &str,
        limit: u32,
        timeout: Duration,
    ) -> Result<HistoryReply, BankCallError>;

    async fn prepare_transaction(
        &self,
        prepare: ParticipantPrepare,
        timeout: Duration,
    ) -> Result<PrepareVote, BankCallError>;

    async fn commit_transaction(
        &self,
        transaction_id: &str,
        timeout: Duration,
    ) -> Result<CommitAck, BankCallError>;

    async fn abort_transaction(
        &self,
        transaction_id: &str,
        timeout: Duration,
    ) -> Result<(), BankCallError>;
}
