use crate::api::proto::payment::payment_gateway_server::PaymentGateway;
use crate::api::proto::payment::{
    AuthRequest, AuthResponse, BalanceRequest, BalanceResponse, HistoryRequest, HistoryResponse,
    PaymentRequest, PaymentResponse, Transaction,
};
use crate::domain::entities::SessionToken;
use crate::infrastructure::token_store::TokenStore;
use crate::use_cases::authenticate::AuthenticateUseCase;
use crate::use_cases::check_balance::CheckBalanceUseCase;
use crate::use_cases::get_transaction_history::GetTransactionHistoryUseCase;
use crate::use_cases::process_payment::{PaymentCommand, ProcessPaymentUseCase};
use crate::use_cases::two_phase_transfer::OutcomeClass;
use std::sync::Arc;
use tonic::metadata::MetadataMap;
use tonic::{Request, Response, Status};
use tracing::info;

/// Frontera gRPC del gateway.
///
/// Toda RPC salvo `Authenticate` pasa primero por la guarda de token: el
/// token viaja en la metadata `token` y un token ausente, desconocido o
/// vencido corta el request con `unauthenticated` antes de tocar ningun
/// banco. La autorizacion por cuenta se decide dentro de cada metodo,
/// porque la identidad de la cuenta viene en el body.
pub struct PaymentGatewayService {
    tokens: Arc<TokenStore>,
    authenticate_uc: AuthenticateUseCase,
    check_balance_uc: CheckBalanceUseCase,
    get_history_uc: GetTransactionHistoryUseCase,
    process_payment_uc: ProcessPaymentUseCase,
}

impl PaymentGatewayService {
    pub fn new(
        tokens: Arc<TokenStore>,
        authenticate_uc: AuthenticateUseCase,
        check_balance_uc: CheckBalanceUseCase,
        get_history_uc: GetTransactionHistoryUseCase,
        process_payment_uc: ProcessPaymentUseCase,
    ) -> Self {
        Self {
            tokens,
            authenticate_uc,
            check_balance_uc,
            get_history_uc,
            process_payment_uc,
        }
    }

    fn session(&self, metadata: &MetadataMap) -> Result<SessionToken, Status> {
        let token = metadata
            .get("token")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Status::unauthenticated("Invalid or missing authentication token"))?;

        self.tokens
            .validate(token)
            .ok_or_else(|| Status::unauthenticated("Invalid or missing authentication token"))
    }
}

#[tonic::async_trait]
impl PaymentGateway for PaymentGatewayService {
    async fn authenticate(
        &self,
        request: Request<AuthRequest>,
    ) -> Result<Response<AuthResponse>, Status> {
        let req = request.into_inner();

        let outcome = self
            .authenticate_uc
            .execute(&req.username, &req.password, &req.bank_name)
            .await;

        Ok(Response::new(AuthResponse {
            success: outcome.success,
            token: outcome.token,
            message: outcome.message,
        }))
    }

    async fn check_balance(
        &self,
        request: Request<BalanceRequest>,
    ) -> Result<Response<BalanceResponse>, Status> {
        let session = self.session(request.metadata())?;
        let req = request.into_inner();

        let outcome = self.check_balance_uc.execute(&session, &req.account_id).await;

        Ok(Response::new(BalanceResponse {
            success: outcome.success,
            balance: outcome.balance.to_string(),
            message: outcome.message,
        }))
    }

    async fn process_payment(
        &self,
        request: Request<PaymentRequest>,
    ) -> Result<Response<PaymentResponse>, Status> {
        let session = self.session(request.metadata())?;
        let req = request.into_inner();

        let resolution = self
            .process_payment_uc
            .execute(
                &session,
                PaymentCommand {
                    payment_id: req.payment_id,
                    sender_account: req.sender_account,
                    receiver_account: req.receiver_account,
                    receiver_bank: req.receiver_bank,
                    amount: req.amount,
                },
            )
            .await;

        // Un fallo transitorio viaja como status `unavailable`: el cliente
        // lo usa para dejar el pago encolado y reintentar mas tarde
        if resolution.class == OutcomeClass::Transient {
            return Err(Status::unavailable(resolution.outcome.message));
        }

        let outcome = resolution.outcome;
        info!(
            "Transaction completed: Client={}, Status={}",
            session.username, outcome.status
        );

        Ok(Response::new(PaymentResponse {
            success: outcome.success,
            transaction_id: outcome.transaction_id,
            status: outcome.status.as_str().to_string(),
            message: outcome.message,
        }))
    }

    async fn get_transaction_history(
        &self,
        request: Request<HistoryRequest>,
    ) -> Result<Response<HistoryResponse>, Status> {
        let session = self.session(request.metadata())?;
        let req = request.into_inner();

        let outcome = self
            .get_history_uc
            .execute(&session, &req.account_id, req.limit)
            .await;

        Ok(Response::new(HistoryResponse {
            success: outcome.success,
            transactions: outcome
                .transactions
                .into_iter()
                .map(|record| Transaction {
                    transaction_id: record.transaction_id,
                    r#type: record.kind,
                    amount: record.amount,
                    counterparty: record.counterparty,
                    timestamp: record.timestamp,
                    status: record.status,
                })
                .collect(),
            message: outcome.message,
        }))
    }
}
