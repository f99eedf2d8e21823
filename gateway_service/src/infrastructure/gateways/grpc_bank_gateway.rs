use crate::api::proto::payment::bank_service_client::BankServiceClient;
use crate::api::proto::payment::{
    AbortTransactionRequest, BankBalanceRequest, BankHistoryRequest, CommitTransactionRequest,
    CredentialVerificationRequest, PrepareTransactionRequest,
};
use crate::domain::entities::{
    BalanceReply, CommitAck, CredentialCheck, HistoryRecord, HistoryReply, ParticipantPrepare,
    PrepareVote,
};
use crate::domain::gateways::{BankCallError, BankGateway};
use async_trait::async_trait;
use common::money;
use std::time::Duration;
use tokio::sync::Mutex;
use tonic::transport::{Channel, ClientTlsConfig};
use tonic::{Code, Request, Status};
use tracing::{info, warn};

fn map_status(status: Status) -> BankCallError {
    match status.code() {
        Code::DeadlineExceeded => BankCallError::DeadlineExceeded,
        Code::Unavailable => BankCallError::Unavailable(status.message().to_string()),
        code => BankCallError::Rpc(format!("{:?}: {}", code, status.message())),
    }
}

/// Gateway gRPC hacia un banco, con canal perezoso.
///
/// El canal se establece en el primer uso y se cachea; un banco que
/// arranca despues que el gateway se vuelve alcanzable sin reiniciar nada.
/// Ante un error de transporte el canal cacheado se invalida para que la
/// proxima llamada reconecte.
pub struct GrpcBankGateway {
    bank_name: String,
    address: String,
    tls: ClientTlsConfig,
    client: Mutex<Option<BankServiceClient<Channel>>>,
}

impl GrpcBankGateway {
    pub fn new(bank_name: &str, address: &str, tls: ClientTlsConfig) -> Self {
        Self {
            bank_name: bank_name.to_string(),
            address: address.to_string(),
            tls,
            client: Mutex::new(None),
        }
    }

    async fn connect(&self) -> Result<BankServiceClient<Channel>, BankCallError> {
        let mut guard = self.client.lock().await;

        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let channel = Channel::from_shared(self.address.clone())
            .map_err(|e| BankCallError::Unavailable(e.to_string()))?
            .tls_config(self.tls.clone())
            .map_err(|e| BankCallError::Unavailable(e.to_string()))?
            .connect()
            .await
            .map_err(|e| BankCallError::Unavailable(e.to_string()))?;

        let client = BankServiceClient::new(channel);
        *guard = Some(client.clone());
        info!("Connected to bank {} at {}", self.bank_name, self.address);

        Ok(client)
    }

    /// Resuelve el timeout y, si el canal esta roto, lo descarta.
    async fn settle<T>(
        &self,
        outcome: Result<Result<T, BankCallError>, tokio::time::error::Elapsed>,
    ) -> Result<T, BankCallError> {
        let result = match outcome {
            Err(_) => Err(BankCallError::DeadlineExceeded),
            Ok(inner) => inner,
        };

        if matches!(&result, Err(BankCallError::Unavailable(_))) {
            warn!("Channel to bank {} marked broken", self.bank_name);
            self.client.lock().await.take();
        }

        result
    }
}

#[async_trait]
impl BankGateway for GrpcBankGateway {
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<CredentialCheck, BankCallError> {
        let request = CredentialVerificationRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let outcome = tokio::time::timeout(timeout, async {
            let mut client = self.connect().await?;
            client
                .verify_credentials(Request::new(request))
                .await
                .map_err(map_status)
        })
        .await;

        let response = self.settle(outcome).await?.into_inner();
        Ok(CredentialCheck {
            valid: response.valid,
            account_id: response.account_id,
            message: response.message,
        })
    }

    async fn get_balance(
        &self,
        account_id: &str,
        timeout: Duration,
    ) -> Result<BalanceReply, BankCallError> {
        let request = BankBalanceRequest {
            account_id: account_id.to_string(),
        };

        let outcome = tokio::time::timeout(timeout, async {
            let mut client = self.connect().await?;
            client
                .get_balance(Request::new(request))
                .await
                .map_err(map_status)
        })
        .await;

        let response = self.settle(outcome).await?.into_inner();
        let balance = money::parse_decimal(&response.balance)
            .map_err(|e| BankCallError::Rpc(format!("Malformed balance from bank: {}", e)))?;

        Ok(BalanceReply {
            success: response.success,
            balance,
            message: response.message,
        })
    }

    async fn get_transaction_history(
        &self,
        account_id: &str,
        limit: u32,
        timeout: Duration,
    ) -> Result<HistoryReply, BankCallError> {
        let request = BankHistoryRequest {
            account_id: account_id.to_string(),
            limit,
        };

        let outcome = tokio::time::timeout(timeout, async {
            let mut client = self.connect().await?;
            client
                .get_transaction_history(Request::new(request))
                .await
                .map_err(map_status)
        })
        .await;

        let response = self.settle(outcome).await?.into_inner();
        Ok(HistoryReply {
            success: response.success,
            transactions: response
                .transactions
                .into_iter()
                .map(|tx| HistoryRecord {
                    transaction_id: tx.transaction_id,
                    kind: tx.r#type,
                    amount: tx.amount,
                    counterparty: tx.counterparty,
                    timestamp: tx.timestamp,
                    status: tx.status,
                })
                .collect(),
            message: response.message,
        })
    }

    async fn prepare_transaction(
        &self,
        prepare: ParticipantPrepare,
        timeout: Duration,
    ) -> Result<PrepareVote, BankCallError> {
        let request = PrepareTransactionRequest {
            transaction_id: prepare.transaction_id,
            account_id: prepare.account_id,
            r#type: prepare.kind.as_str().to_string(),
            amount: prepare.amount.to_string(),
            counterparty: prepare.counterparty,
        };

        let outcome = tokio::time::timeout(timeout, async {
            let mut client = self.connect().await?;
            client
                .prepare_transaction(Request::new(request))
                .await
                .map_err(map_status)
        })
        .await;

        let response = self.settle(outcome).await?.into_inner();
        Ok(PrepareVote {
            ready: response.ready,
            message: response.message,
        })
    }

    async fn commit_transaction(
        &self,
        transaction_id: &str,
        timeout: Duration,
    ) -> Result<CommitAck, BankCallError> {
        let request = CommitTransactionRequest {
            transaction_id: transaction_id.to_string(),
        };

        let outcome = tokio::time::timeout(timeout, async {
            let mut client = self.connect().await?;
            client
                .commit_transaction(Request::new(request))
                .await
                .map_err(map_status)
        })
        .await;

        let response = self.settle(outcome).await?.into_inner();
        Ok(CommitAck {
            success: response.success,
            message: response.message,
        })
    }

    async fn abort_transaction(
        &self,
        transaction_id: &str,
        timeout: Duration,
    ) -> Result<(), BankCallError> {
        let request = AbortTransactionRequest {
            transaction_id: transaction_id.to_string(),
        };

        let outcome = tokio::time::timeout(timeout, async {
            let mut client = self.connect().await?;
            client
                .abort_transaction(Request::new(request))
                .await
                .map_err(map_status)
        })
        .await;

        self.settle(outcome).await?;
        Ok(())
    }
}
