use crate::domain::entities::{PaymentOutcome, SessionToken};
use crate::infrastructure::bank_directory::BankDirectory;
use crate::infrastructure::idempotency_cache::IdempotencyCache;
use crate::use_cases::two_phase_transfer::{
    OutcomeClass, TransferRequest, TwoPhaseTransferUseCase,
};
use common::money;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PaymentCommand {
    pub payment_id: String,
    pub sender_account: String,
    pub receiver_account: String,
    pub receiver_bank: String,
    pub amount: String,
}

/// Desenlace del pago mas su clasificacion. La capa gRPC responde los
/// terminales como respuestas estructuradas y los transitorios como status
/// `unavailable`, que es lo que el cliente usa para decidir si el pago
/// sigue encolado.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentResolution {
    pub outcome: PaymentOutcome,
    pub class: OutcomeClass,
}

impl PaymentResolution {
    fn terminal(outcome: PaymentOutcome) -> Self {
        Self {
            outcome,
            class: OutcomeClass::Terminal,
        }
    }

    fn transient(outcome: PaymentOutcome) -> Self {
        Self {
            outcome,
            class: OutcomeClass::Transient,
        }
    }
}

/// Orquestacion de un pago: autorizacion, idempotencia, validaciones y
/// pre-chequeo de fondos antes de entrar al coordinador 2PC.
///
/// La consulta al cache precede a cualquier comunicacion con bancos: un
/// hit terminal se devuelve tal cual. Solo los desenlaces terminales se
/// escriben; un fallo transitorio deja el payment id libre para que el
/// reintento vuelva a intentar con los mismos ids de participante.
pub struct ProcessPaymentUseCase {
    banks: Arc<BankDirectory>,
    idempotency: Arc<IdempotencyCache>,
    transfer: Arc<TwoPhaseTransferUseCase>,
    call_timeout: Duration,
}

impl ProcessPaymentUseCase {
    pub fn new(
        banks: Arc<BankDirectory>,
        idempotency: Arc<IdempotencyCache>,
        transfer: Arc<TwoPhaseTransferUseCase>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            banks,
            idempotency,
            transfer,
            call_timeout,
        }
    }

    pub async fn execute(&self, session: &SessionToken, cmd: PaymentCommand) -> PaymentResolution {
        // Autorizacion: solo se paga desde la cuenta propia
        if cmd.sender_account != "self" && cmd.sender_account != session.account_id {
            warn!(
                "User {} tried to pay from account {}",
                session.username, cmd.sender_account
            );
            return PaymentResolution::terminal(PaymentOutcome::failed(
                "",
                "Authorization failed: Not your account".to_string(),
            ));
        }

        // Idempotencia: un hit terminal se devuelve tal cual
        if !cmd.payment_id.is_empty() {
            if let Some(cached) = self.idempotency.get(&cmd.payment_id) {
                info!(
                    "Returning cached result for idempotent request: {}",
                    cmd.payment_id
                );
                return PaymentResolution::terminal(cached);
            }
        }

        let amount = match money::parse_amount(&cmd.amount) {
            Ok(amount) => amount,
            Err(e) => {
                return self.conclude(
                    &cmd.payment_id,
                    PaymentOutcome::failed("", e.to_string()),
                    OutcomeClass::Terminal,
                );
            }
        };

        if self.banks.get(&cmd.receiver_bank).is_none() {
            return self.conclude(
                &cmd.payment_id,
                PaymentOutcome::failed(
                    "",
                    format!("Receiver bank {} not found", cmd.receiver_bank),
                ),
                OutcomeClass::Terminal,
            );
        }

        let sender_bank = match self.banks.get(&session.bank) {
            Some(bank) => bank,
            None => {
                return self.conclude(
                    &cmd.payment_id,
                    PaymentOutcome::failed("", format!("Sender bank {} not found", session.bank)),
                    OutcomeClass::Terminal,
                );
            }
        };

        // Pre-chequeo de fondos contra el banco emisor. El 2PC re-verifica
        // de todos modos; esto corta temprano los pagos imposibles.
        match sender_bank
            .get_balance(&session.account_id, self.call_timeout)
            .await
        {
            Ok(reply) if !reply.success => {
                return self.conclude(
                    &cmd.payment_id,
                    PaymentOutcome::failed(
                        "",
                        format!("Could not verify balance: {}", reply.message),
                    ),
                    OutcomeClass::Terminal,
                );
            }
            Ok(reply) if reply.balance < amount => {
                return self.conclude(
                    &cmd.payment_id,
                    PaymentOutcome::failed(
                        "",
                        format!(
                            "Authorization failed: Insufficient funds. Available: {}, Required: {}",
                            reply.balance, amount
                        ),
                    ),
                    OutcomeClass::Terminal,
                );
            }
            Ok(_) => {}
            Err(e) => {
                // Fallo de transporte: no se cachea, el reintento decide
                return PaymentResolution::transient(PaymentOutcome::failed(
                    "",
                    format!("Could not verify balance: {}", e),
                ));
            }
        }

        let result = self
            .transfer
            .execute(&TransferRequest {
                payment_id: cmd.payment_id.clone(),
                sender_bank: session.bank.clone(),
                sender_account: session.account_id.clone(),
                receiver_bank: cmd.receiver_bank,
                receiver_account: cmd.receiver_account,
                amount,
            })
            .await;

        self.conclude(&cmd.payment_id, result.response, result.class)
    }

    fn conclude(
        &self,
        payment_id: &str,
        outcome: PaymentOutcome,
        class: OutcomeClass,
    ) -> PaymentResolution {
        if class == OutcomeClass::Terminal && !payment_id.is_empty() {
            self.idempotency.put(payment_id, outcome.clone());
        }
        PaymentResolution { outcome, class }
    }
}
