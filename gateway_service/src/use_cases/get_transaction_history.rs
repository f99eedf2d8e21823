use crate::domain::entities::{HistoryRecord, SessionToken};
use crate::infrastructure::bank_directory::BankDirectory;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const DEFAULT_HISTORY_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryOutcome {
    pub success: bool,
    pub transactions: Vec<HistoryRecord>,
    pub message: String,
}

impl HistoryOutcome {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            transactions: vec![],
            message,
        }
    }
}

/// Historial de movimientos de la cuenta ligada al token. Un account id
/// vacio significa la cuenta propia; uno ajeno se rechaza.
pub struct GetTransactionHistoryUseCase {
    banks: Arc<BankDirectory>,
    call_timeout: Duration,
}

impl GetTransactionHistoryUseCase {
    pub fn new(banks: Arc<BankDirectory>, call_timeout: Duration) -> Self {
        Self {
            banks,
            call_timeout,
        }
    }

    pub async fn execute(
        &self,
        session: &SessionToken,
        requested_account: &str,
        limit: u32,
    ) -> HistoryOutcome {
        if !requested_account.is_empty() && requested_account != session.account_id {
            warn!(
                "User {} tried to view transactions of account {}",
                session.username, requested_account
            );
            return HistoryOutcome::failure("Authorization failed: Not your account".to_string());
        }

        let bank = match self.banks.get(&session.bank) {
            Some(bank) => bank,
            None => return HistoryOutcome::failure(format!("Bank {} not found", session.bank)),
        };

        let limit = if limit == 0 {
            DEFAULT_HISTORY_LIMIT
        } else {
            limit
        };

        match bank
            .get_transaction_history(&session.account_id, limit, self.call_timeout)
            .await
        {
            Ok(reply) => {
                info!(
                    "Transaction history retrieved for user {} at bank {}",
                    session.username, session.bank
                );
                HistoryOutcome {
                    success: reply.success,
                    transactions: reply.transactions,
                    message: reply.message,
                }
            }
            Err(e) => {
                error!("Error retrieving transaction history: {}", e);
                HistoryOutcome::failure(format!("Failed to retrieve transaction history: {}", e))
            }
        }
    }
}
