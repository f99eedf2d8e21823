use crate::domain::entities::{ParticipantPrepare, PaymentOutcome};
use crate::domain::gateways::{BankCallError, BankGateway};
use crate::infrastructure::bank_directory::BankDirectory;
use common::types::TransactionKind;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Margen antes de pasar a la siguiente fase: si queda menos que esto del
/// presupuesto, se aborta en lugar de arriesgar un timeout a mitad de fase.
const SAFETY_MARGIN: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub payment_id: String,
    pub sender_bank: String,
    pub sender_account: String,
    pub receiver_bank: String,
    pub receiver_account: String,
    pub amount: Decimal,
}

/// Clasificacion del desenlace para la capa de idempotencia: los
/// transitorios no se cachean, para que el reintento del cliente pueda
/// progresar; los terminales se cachean tal cual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeClass {
    Terminal,
    Transient,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    pub response: PaymentOutcome,
    pub class: OutcomeClass,
}

impl TransferOutcome {
    fn terminal(response: PaymentOutcome) -> Self {
        Self {
            response,
            class: OutcomeClass::Terminal,
        }
    }

    fn transient(response: PaymentOutcome) -> Self {
        Self {
            response,
            class: OutcomeClass::Transient,
        }
    }
}

/// Coordinador 2PC para un pago entre dos bancos.
///
/// Orden estricto por pago: prepare emisor -> prepare receptor -> commit
/// emisor -> commit receptor, con presupuesto de tiempo por fase. Hasta el
/// commit del emisor todo fallo se resuelve abortando y el pago queda en
/// `failed` sin mover fondos. A partir de ese commit ya no se aborta nada:
/// cualquier fallo posterior es el estado critico `error`, que requiere
/// conciliacion externa y por eso se cachea (reintentarlo debitaria dos
/// veces al emisor).
pub struct TwoPhaseTransferUseCase {
    banks: Arc<BankDirectory>,
    phase_timeout: Duration,
    abort_timeout: Duration,
}

impl TwoPhaseTransferUseCase {
    pub fn new(banks: Arc<BankDirectory>, phase_timeout: Duration, abort_timeout: Duration) -> Self {
        Self {
            banks,
            phase_timeout,
            abort_timeout,
        }
    }

    pub async fn execute(&self, req: &TransferRequest) -> TransferOutcome {
        let global_id = global_transaction_id(&req.payment_id);

        info!(
            "Processing payment with 2PC: {} from {}/{} to {}/{}",
            req.amount, req.sender_bank, req.sender_account, req.receiver_bank, req.receiver_account
        );

        // Auto-transferencia: no hay nada que mover ni banco que tocar
        if req.sender_bank == req.receiver_bank && req.sender_account == req.receiver_account {
            info!("Self-transfer detected, no actual transfer needed");
            return TransferOutcome::terminal(PaymentOutcome::completed(
                &global_id,
                "Self-transfer processed successfully (no balance change)",
            ));
        }

        let sender = match self.banks.get(&req.sender_bank) {
            Some(bank) => bank,
            None => {
                return TransferOutcome::terminal(PaymentOutcome::failed(
                    &global_id,
                    format!("Sender bank {} not found", req.sender_bank),
                ));
            }
        };
        let receiver = match self.banks.get(&req.receiver_bank) {
            Some(bank) => bank,
            None => {
                return TransferOutcome::terminal(PaymentOutcome::failed(
                    &global_id,
                    format!("Receiver bank {} not found", req.receiver_bank),
                ));
            }
        };

        // Ids por participante, estables bajo reintento del mismo payment id:
        // el Prepare del banco es idempotente en la practica
        let sender_tx_id = format!("{}-sender-{}", global_id, req.payment_id);
        let receiver_tx_id = format!("{}-receiver-{}", global_id, req.payment_id);

        // FASE 1: Prepare - pedir el voto a ambos participantes
        info!("2PC Phase 1: Prepare transactions");
        let deadline = Instant::now() + self.phase_timeout;

        let sender_prepare = ParticipantPrepare {
            transaction_id: sender_tx_id.clone(),
            account_id: req.sender_account.clone(),
            kind: TransactionKind::Debit,
            amount: req.amount,
            counterparty: format!("{}/{}", req.receiver_bank, req.receiver_account),
        };

        match sender
            .prepare_transaction(sender_prepare, remaining(deadline))
            .await
        {
            Ok(vote) if !vote.ready => {
                // El emisor no acepto: no hay nada preparado que abortar
                warn!("Sender bank voted NO: {}", vote.message);
                return TransferOutcome::terminal(PaymentOutcome::failed(
                    &global_id,
                    format!("Sender bank cannot process: {}", vote.message),
                ));
            }
            Ok(_) => {}
            Err(BankCallError::DeadlineExceeded) => {
                error!("Timeout while preparing transaction with sender bank");
                return TransferOutcome::transient(PaymentOutcome::failed(
                    &global_id,
                    "Transaction timed out during preparation (sender)".to_string(),
                ));
            }
            Err(e) => {
                error!("Error preparing transaction with sender bank: {}", e);
                return TransferOutcome::transient(PaymentOutcome::failed(
                    &global_id,
                    format!("Error communicating with sender bank: {}", e),
                ));
            }
        }

        if remaining(deadline) <= SAFETY_MARGIN {
            error!("Approaching timeout, aborting transaction");
            self.abort_best_effort(&sender, &sender_tx_id).await;
            return TransferOutcome::transient(PaymentOutcome::failed(
                &global_id,
                "Transaction timed out during preparation phase".to_string(),
            ));
        }

        let receiver_prepare = ParticipantPrepare {
            transaction_id: receiver_tx_id.clone(),
            account_id: req.receiver_account.clone(),
            kind: TransactionKind::Credit,
            amount: req.amount,
            counterparty: format!("{}/{}", req.sender_bank, req.sender_account),
        };

        match receiver
            .prepare_transaction(receiver_prepare, remaining(deadline))
            .await
        {
            Ok(vote) if !vote.ready => {
                warn!("Receiver bank voted NO: {}", vote.message);
                self.abort_best_effort(&sender, &sender_tx_id).await;
                return TransferOutcome::terminal(PaymentOutcome::failed(
                    &global_id,
                    format!("Receiver bank cannot process: {}", vote.message),
                ));
            }
            Ok(_) => {}
            Err(BankCallError::DeadlineExceeded) => {
                error!("Timeout while preparing transaction with receiver bank");
                self.abort_best_effort(&sender, &sender_tx_id).await;
                return TransferOutcome::transient(PaymentOutcome::failed(
                    &global_id,
                    "Transaction timed out during preparation (receiver)".to_string(),
                ));
            }
            Err(e) => {
                error!("Error preparing transaction with receiver bank: {}", e);
                self.abort_best_effort(&sender, &sender_tx_id).await;
                return TransferOutcome::transient(PaymentOutcome::failed(
                    &global_id,
                    format!("Error communicating with receiver bank: {}", e),
                ));
            }
        }

        if remaining(deadline) <= SAFETY_MARGIN {
            error!("Approaching timeout after preparation phase, aborting transaction");
            self.abort_best_effort(&sender, &sender_tx_id).await;
            self.abort_best_effort(&receiver, &receiver_tx_id).await;
            return TransferOutcome::transient(PaymentOutcome::failed(
                &global_id,
                "Transaction timed out before commit phase".to_string(),
            ));
        }

        // FASE 2: Commit - ambos votaron YES; presupuesto fresco
        info!("2PC Phase 2: Commit transactions");
        let deadline = Instant::now() + self.phase_timeout;

        match sender
            .commit_transaction(&sender_tx_id, remaining(deadline))
            .await
        {
            Ok(ack) if !ack.success => {
                error!(
                    "Critical 2PC error: Sender commit failed after both voted YES: {}",
                    ack.message
                );
                self.abort_best_effort(&receiver, &receiver_tx_id).await;
                return TransferOutcome::terminal(PaymentOutcome::failed(
                    &global_id,
                    format!("Transaction failed during commit phase: {}", ack.message),
                ));
            }
            Ok(_) => {}
            Err(BankCallError::DeadlineExceeded) => {
                // Estado ambiguo del emisor; el receptor sigue preparado y
                // abortarlo es seguro. No se reintenta: el debito pudo entrar.
                error!("Timeout while committing transaction with sender bank");
                self.abort_best_effort(&receiver, &receiver_tx_id).await;
                self.abort_best_effort(&sender, &sender_tx_id).await;
                return TransferOutcome::terminal(PaymentOutcome::failed(
                    &global_id,
                    "Transaction timed out during commit phase (sender)".to_string(),
                ));
            }
            Err(e) => {
                error!("Error committing transaction with sender bank: {}", e);
                self.abort_best_effort(&receiver, &receiver_tx_id).await;
                self.abort_best_effort(&sender, &sender_tx_id).await;
                return TransferOutcome::terminal(PaymentOutcome::failed(
                    &global_id,
                    format!("Error committing to sender bank: {}", e),
                ));
            }
        }

        // A partir de aca el emisor committeo: ya no se aborta nada
        if remaining(deadline) <= SAFETY_MARGIN {
            error!("Approaching timeout after sender commit, critical state");
            return TransferOutcome::terminal(PaymentOutcome::critical(
                &global_id,
                "CRITICAL ERROR: Transaction timed out after sender committed. \
                 System may be in inconsistent state."
                    .to_string(),
            ));
        }

        match receiver
            .commit_transaction(&receiver_tx_id, remaining(deadline))
            .await
        {
            Ok(ack) if !ack.success => {
                error!(
                    "Critical 2PC error: Receiver commit failed after sender committed: {}",
                    ack.message
                );
                TransferOutcome::terminal(PaymentOutcome::critical(
                    &global_id,
                    format!(
                        "CRITICAL ERROR: Sender debited but receiver credit failed: {}",
                        ack.message
                    ),
                ))
            }
            Ok(_) => {
                info!("2PC completed successfully for transaction {}", global_id);
                TransferOutcome::terminal(PaymentOutcome::completed(
                    &global_id,
                    "Payment processed successfully",
                ))
            }
            Err(BankCallError::DeadlineExceeded) => {
                error!("Timeout while committing transaction with receiver bank");
                TransferOutcome::terminal(PaymentOutcome::critical(
                    &global_id,
                    "CRITICAL ERROR: Transaction timed out during commit phase (receiver). \
                     Sender was debited but receiver may not be credited."
                        .to_string(),
                ))
            }
            Err(e) => {
                error!("Error committing transaction with receiver bank: {}", e);
                TransferOutcome::terminal(PaymentOutcome::critical(
                    &global_id,
                    format!(
                        "CRITICAL ERROR: Error committing to receiver bank: {}. \
                         Sender was debited but receiver may not be credited.",
                        e
                    ),
                ))
            }
        }
    }

    // El fallo de un abort se loguea y nunca pisa un desenlace ya decidido.
    // Abortar un id desconocido es exito en el banco, asi que repetir
    // aborts es seguro.
    async fn abort_best_effort(&self, bank: &Arc<dyn BankGateway>, transaction_id: &str) {
        if let Err(e) = bank
            .abort_transaction(transaction_id, self.abort_timeout)
            .await
        {
            error!("Error aborting transaction {}: {}", transaction_id, e);
        }
    }
}

/// Id global del pago. Derivado del payment id para que un reintento del
/// mismo pago use los mismos ids de participante (y el Prepare del banco
/// responda con el voto ya almacenado en lugar de preparar de nuevo).
fn global_transaction_id(payment_id: &str) -> String {
    if payment_id.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, payment_id.as_bytes()).to_string()
    }
}

fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}
