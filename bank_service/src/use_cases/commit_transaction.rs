use crate::domain::entities::{CommitAck, LedgerEntry};
use crate::domain::error::BankError;
use crate::domain::repository::{AccountRepository, LedgerRepository};
use crate::infrastructure::prepared_store::PreparedTransactionStore;
use common::types::TransactionKind;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fase 2 del 2PC: aplicar la transaccion preparada.
///
/// El delta y el alta en el ledger se hacen con el id de participante como
/// transaction id, de modo que el historial enlaza con el pago global. Un
/// Commit de un id desconocido (incluido un banco reiniciado que perdio su
/// tabla de preparadas) devuelve un fallo estructurado "not prepared".
pub struct CommitTransactionUseCase {
    accounts: Arc<dyn AccountRepository>,
    ledger: Arc<dyn LedgerRepository>,
    prepared: Arc<PreparedTransactionStore>,
}

impl CommitTransactionUseCase {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        ledger: Arc<dyn LedgerRepository>,
        prepared: Arc<PreparedTransactionStore>,
    ) -> Self {
        Self {
            accounts,
            ledger,
            prepared,
        }
    }

    pub async fn execute(&self, transaction_id: &str) -> Result<CommitAck, BankError> {
        info!("Commit transaction request: id={}", transaction_id);

        // La entrada se consume al commitear: un segundo Commit del mismo id
        // responde "not prepared" en lugar de aplicar el delta dos veces.
        let tx = match self.prepared.remove(transaction_id).await {
            Some(tx) => tx,
            None => {
                warn!("Cannot commit unprepared transaction: {}", transaction_id);
                return Ok(CommitAck {
                    success: false,
                    message: "Transaction not prepared".to_string(),
                });
            }
        };

        let delta = match tx.kind {
            TransactionKind::Debit => -tx.amount,
            TransactionKind::Credit => tx.amount,
        };

        match self.accounts.apply_delta(&tx.account_id, delta).await {
            Ok(_) => {
                self.ledger
                    .append(
                        &tx.account_id,
                        LedgerEntry::completed_with_id(
                            transaction_id,
                            tx.kind,
                            tx.amount,
                            &tx.counterparty,
                        ),
                    )
                    .await?;

                info!("Transaction {} committed successfully", transaction_id);
                Ok(CommitAck {
                    success: true,
                    message: "Transaction committed successfully".to_string(),
                })
            }
            Err(BankError::InsufficientFunds { balance, .. }) => {
                // Dos prepares concurrentes pudieron votar YES contra los
                // mismos fondos; el perdedor aparece recien aqui.
                warn!(
                    "Commit {} rejected at apply time: balance={}, amount={}",
                    transaction_id, balance, tx.amount
                );
                Ok(CommitAck {
                    success: false,
                    message: format!(
                        "Insufficient funds at commit time. Current balance: {}",
                        balance
                    ),
                })
            }
            Err(e) => {
                error!("Error committing transaction {}: {}", transaction_id, e);
                Ok(CommitAck {
                    success: false,
                    message: format!("Error committing transaction: {}", e),
                })
            }
        }
    }
}
