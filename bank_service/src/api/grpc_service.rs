use crate::api::proto::payment::bank_service_server::BankService;
use crate::api::proto::payment::{
    AbortTransactionRequest, AbortTransactionResponse, BankBalanceRequest, BankBalanceResponse,
    BankHistoryRequest, BankHistoryResponse, BankTransactionRequest, BankTransactionResponse,
    CommitTransactionRequest, CommitTransactionResponse, CredentialVerificationRequest,
    CredentialVerificationResponse, PrepareTransactionRequest, PrepareTransactionResponse,
    Transaction,
};
use crate::domain::entities::LedgerEntry;
use crate::domain::error::BankError;
use crate::use_cases::abort_transaction::AbortTransactionUseCase;
use crate::use_cases::commit_transaction::CommitTransactionUseCase;
use crate::use_cases::get_balance::GetBalanceUseCase;
use crate::use_cases::get_transaction_history::GetTransactionHistoryUseCase;
use crate::use_cases::prepare_transaction::{PrepareCommand, PrepareTransactionUseCase};
use crate::use_cases::process_transaction::{DirectTransactionCommand, ProcessTransactionUseCase};
use crate::use_cases::verify_credentials::VerifyCredentialsUseCase;
use common::money;
use common::types::TransactionKind;
use tonic::{Request, Response, Status};

// Frontera gRPC del banco. Los fallos de negocio viajan como respuestas
// estructuradas (success=false); `Status` queda reservado para errores de
// almacenamiento y de transporte, que el gateway clasifica como transitorios.
pub struct BankGrpcService {
    verify_credentials_uc: VerifyCredentialsUseCase,
    get_balance_uc: GetBalanceUseCase,
    get_history_uc: GetTransactionHistoryUseCase,
    process_transaction_uc: ProcessTransactionUseCase,
    prepare_transaction_uc: PrepareTransactionUseCase,
    commit_transaction_uc: CommitTransactionUseCase,
    abort_transaction_uc: AbortTransactionUseCase,
}

impl BankGrpcService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        verify_credentials_uc: VerifyCredentialsUseCase,
        get_balance_uc: GetBalanceUseCase,
        get_history_uc: GetTransactionHistoryUseCase,
        process_transaction_uc: ProcessTransactionUseCase,
        prepare_transaction_uc: PrepareTransactionUseCase,
        commit_transaction_uc: CommitTransactionUseCase,
        abort_transaction_uc: AbortTransactionUseCase,
    ) -> Self {
        Self {
            verify_credentials_uc,
            get_balance_uc,
            get_history_uc,
            process_transaction_uc,
            prepare_transaction_uc,
            commit_transaction_uc,
            abort_transaction_uc,
        }
    }
}

fn storage_status(err: BankError) -> Status {
    Status::internal(err.to_string())
}

fn to_proto_transaction(entry: LedgerEntry) -> Transaction {
    Transaction {
        transaction_id: entry.transaction_id,
        r#type: entry.kind.as_str().to_string(),
        amount: entry.amount.to_string(),
        counterparty: entry.counterparty,
        timestamp: entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        status: entry.status,
    }
}

#[tonic::async_trait]
impl BankService for BankGrpcService {
    async fn verify_credentials(
        &self,
        request: Request<CredentialVerificationRequest>,
    ) -> Result<Response<CredentialVerificationResponse>, Status> {
        let req = request.into_inner();

        let response = match self
            .verify_credentials_uc
            .execute(&req.username, &req.password)
            .await
            .map_err(storage_status)?
        {
            Some(account) => CredentialVerificationResponse {
                valid: true,
                account_id: account.account_id,
                message: "Credentials verified successfully".to_string(),
            },
            None => CredentialVerificationResponse {
                valid: false,
                account_id: String::new(),
                message: "Invalid username or password".to_string(),
            },
        };

        Ok(Response::new(response))
    }

    async fn get_balance(
        &self,
        request: Request<BankBalanceRequest>,
    ) -> Result<Response<BankBalanceResponse>, Status> {
        let req = request.into_inner();

        let response = match self.get_balance_uc.execute(&req.account_id).await {
            Ok(balance) => BankBalanceResponse {
                success: true,
                balance: balance.to_string(),
                message: "Balance retrieved successfully".to_string(),
            },
            Err(BankError::AccountNotFound(account_id)) => BankBalanceResponse {
                success: false,
                balance: "0".to_string(),
                message: format!("Account {} not found", account_id),
            },
            Err(e) => return Err(storage_status(e)),
        };

        Ok(Response::new(response))
    }

    async fn get_transaction_history(
        &self,
        request: Request<BankHistoryRequest>,
    ) -> Result<Response<BankHistoryResponse>, Status> {
        let req = request.into_inner();

        let response = match self
            .get_history_uc
            .execute(&req.account_id, req.limit as usize)
            .await
        {
            Ok(entries) if entries.is_empty() => BankHistoryResponse {
                success: true,
                transactions: vec![],
                message: "No transactions found for this account".to_string(),
            },
            Ok(entries) => {
                let transactions: Vec<Transaction> =
                    entries.into_iter().map(to_proto_transaction).collect();
                BankHistoryResponse {
                    message: format!("Retrieved {} transactions", transactions.len()),
                    success: true,
                    transactions,
                }
            }
            Err(BankError::AccountNotFound(account_id)) => BankHistoryResponse {
                success: false,
                transactions: vec![],
                message: format!("Account {} not found", account_id),
            },
            Err(e) => return Err(storage_status(e)),
        };

        Ok(Response::new(response))
    }

    async fn process_transaction(
        &self,
        request: Request<BankTransactionRequest>,
    ) -> Result<Response<BankTransactionResponse>, Status> {
        let req = request.into_inner();

        let kind: TransactionKind = match req.r#type.parse() {
            Ok(kind) => kind,
            Err(e) => {
                return Ok(Response::new(BankTransactionResponse {
                    success: false,
                    message: e.to_string(),
                }));
            }
        };

        let amount = match money::parse_amount(&req.amount) {
            Ok(amount) => amount,
            Err(e) => {
                return Ok(Response::new(BankTransactionResponse {
                    success: false,
                    message: e.to_string(),
                }));
            }
        };

        let payment_id = if req.payment_id.is_empty() {
            None
        } else {
            Some(req.payment_id)
        };

        let result = self
            .process_transaction_uc
            .execute(DirectTransactionCommand {
                account_id: req.account_id,
                kind,
                amount,
                counterparty: req.counterparty,
                payment_id,
            })
            .await
            .map_err(storage_status)?;

        Ok(Response::new(BankTransactionResponse {
            success: result.success,
            message: result.message,
        }))
    }

    async fn prepare_transaction(
        &self,
        request: Request<PrepareTransactionRequest>,
    ) -> Result<Response<PrepareTransactionResponse>, Status> {
        let req = request.into_inner();

        let kind: TransactionKind = match req.r#type.parse() {
            Ok(kind) => kind,
            Err(e) => {
                return Ok(Response::new(PrepareTransactionResponse {
                    ready: false,
                    message: e.to_string(),
                }));
            }
        };

        let amount = match money::parse_amount(&req.amount) {
            Ok(amount) => amount,
            Err(e) => {
                return Ok(Response::new(PrepareTransactionResponse {
                    ready: false,
                    message: e.to_string(),
                }));
            }
        };

        let vote = self
            .prepare_transaction_uc
            .execute(PrepareCommand {
                transaction_id: req.transaction_id,
                account_id: req.account_id,
                kind,
                amount,
                counterparty: req.counterparty,
            })
            .await
            .map_err(storage_status)?;

        Ok(Response::new(PrepareTransactionResponse {
            ready: vote.ready,
            message: vote.message,
        }))
    }

    async fn commit_transaction(
        &self,
        request: Request<CommitTransactionRequest>,
    ) -> Result<Response<CommitTransactionResponse>, Status> {
        let req = request.into_inner();

        let ack = self
            .commit_transaction_uc
            .execute(&req.transaction_id)
            .await
            .map_err(storage_status)?;

        Ok(Response::new(CommitTransactionResponse {
            success: ack.success,
            message: ack.message,
        }))
    }

    async fn abort_transaction(
        &self,
        request: Request<AbortTransactionRequest>,
    ) -> Result<Response<AbortTransactionResponse>, Status> {
        let req = request.into_inner();

        let ack = self.abort_transaction_uc.execute(&req.transaction_id).await;

        Ok(Response::new(AbortTransactionResponse {
            success: ack.success,
            message: ack.message,
        }))
    }
}
