use crate::domain::entities::AbortAck;
use crate::infrastructure::prepared_store::PreparedTransactionStore;
use std::sync::Arc;
use tracing::info;

/// Fase 2 del 2PC: descartar la transaccion preparada sin tocar balances.
///
/// Un id ausente tambien es exito ("ya abortado"): el coordinador manda
/// aborts best-effort y puede repetirlos sin riesgo.
pub struct AbortTransactionUseCase {
    prepared: Arc<PreparedTransactionStore>,
}

impl AbortTransactionUseCase {
    pub fn new(prepared: Arc<PreparedTransactionStore>) -> Self {
        Self { prepared }
    }

    pub async fn execute(&self, transaction_id: &str) -> AbortAck {
        info!("Abort transaction request: id={}", transaction_id);

        match self.prepared.remove(transaction_id).await {
            Some(_) => {
                info!("Transaction {} aborted successfully", transaction_id);
                AbortAck {
                    success: true,
                    message: "Transaction aborted successfully".to_string(),
                }
            }
            None => {
                info!("Transaction not found to abort: {}", transaction_id);
                AbortAck {
                    success: true,
                    message: "Transaction not found, considered aborted".to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::PreparedTransaction;
    use chrono::Utc;
    use common::types::TransactionKind;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_abort_removes_prepared_entry() {
        let prepared = Arc::new(PreparedTransactionStore::new());
        prepared
            .insert(PreparedTransaction {
                transaction_id: "gtx-1".to_string(),
                account_id: "ACC001".to_string(),
                username: "user1".to_string(),
                kind: TransactionKind::Debit,
                amount: Decimal::from(10),
                counterparty: "Bank2/ACC002".to_string(),
                prepared_at: Utc::now(),
                ready: true,
                message: "Ready to process transaction".to_string(),
            })
            .await;

        let use_case = AbortTransactionUseCase::new(prepared.clone());
        let ack = use_case.execute("gtx-1").await;

        assert!(ack.success);
        assert_eq!(prepared.len().await, 0);
    }

    #[tokio::test]
    async fn test_abort_of_unknown_id_is_success_with_no_side_effect() {
        let prepared = Arc::new(PreparedTransactionStore::new());
        let use_case = AbortTransactionUseCase::new(prepared.clone());

        let ack = use_case.execute("gtx-ghost").await;

        assert!(ack.success);
        assert_eq!(ack.message, "Transaction not found, considered aborted");
        assert_eq!(prepared.len().await, 0);
    }
}
