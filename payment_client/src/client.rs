use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::pending::{PendingPayment, PendingQueue};
use crate::proto::payment::payment_gateway_client::PaymentGatewayClient;
use crate::proto::payment::{AuthRequest, BalanceRequest, PaymentRequest, PaymentResponse};
use crate::supervisor;
use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use tokio::sync::Mutex;
use tonic::metadata::MetadataValue;
use tonic::transport::Channel;
use tonic::{Code, Request, Status};
use tracing::{error, info};
use uuid::Uuid;

/// Resultado de un intento de pago visto desde el menu.
#[derive(Debug, Clone)]
pub struct PaymentAttempt {
    pub payment_id: String,
    pub success: bool,
    pub message: String,
    /// true si el registro sigue en la cola de pendientes
    pub queued: bool,
}

/// Resumen de una pasada de reintentos sobre la cola.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryReport {
    pub retried: usize,
    pub succeeded: usize,
}

impl fmt::Display for RetryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Retried {} transactions, {} succeeded",
            self.retried, self.succeeded
        )
    }
}

// Una respuesta estructurada es definitiva (el gateway solo responde asi
// para desenlaces terminales); un fallo de transporte deja el pago en cola.
enum SendResult {
    Definitive(PaymentResponse),
    Transport { unavailable: bool, message: String },
}

pub(crate) struct ClientInner {
    pub(crate) config: ClientConfig,
    pub(crate) connection: Mutex<Option<PaymentGatewayClient<Channel>>>,
    pub(crate) connected: AtomicBool,
    pub(crate) token: StdMutex<Option<String>>,
    pub(crate) queue: PendingQueue,
    pub(crate) monitor_running: AtomicBool,
    pub(crate) stop_monitor: AtomicBool,
    pub(crate) monitor_task: StdMutex<Option<tokio::task::JoinHandle<()>>>,
}

/// Cliente del gateway de pagos.
///
/// Clonable y compartible: el menu interactivo y el supervisor de
/// conectividad operan sobre el mismo estado.
#[derive(Clone)]
pub struct PaymentClient {
    pub(crate) inner: Arc<ClientInner>,
    client_id: String,
}

impl PaymentClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        // Id fresco por instancia: solo particiona la cola en disco
        let client_id = Uuid::new_v4().to_string();
        let queue = PendingQueue::new(&config.pending_dir, &client_id)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                connection: Mutex::new(None),
                connected: AtomicBool::new(false),
                token: StdMutex::new(None),
                queue,
                monitor_running: AtomicBool::new(false),
                stop_monitor: AtomicBool::new(false),
                monitor_task: StdMutex::new(None),
            }),
            client_id,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    pub fn token(&self) -> Option<String> {
        self.inner.token.lock().expect("token lock poisoned").clone()
    }

    pub fn pending_payments(&self) -> Vec<(String, PendingPayment)> {
        self.inner.queue.list()
    }

    /// Abre el canal mTLS al gateway y arranca el supervisor de
    /// conectividad (arrancarlo dos veces es un no-op).
    pub async fn connect(&self) -> Result<(), ClientError> {
        let tls = common::tls::client_tls_config(
            &self.inner.config.cert_dir,
            &self.inner.config.tls_domain,
        )?;

        let channel = Channel::from_shared(self.inner.config.gateway_addr.clone())
            .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?
            .tls_config(tls)
            .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?
            .connect()
            .await
            .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?;

        *self.inner.connection.lock().await = Some(PaymentGatewayClient::new(channel));
        self.inner.connected.store(true, Ordering::SeqCst);

        supervisor::start_connectivity_monitor(self);

        Ok(())
    }

    /// Cierra la conexion, descarta el token y frena el supervisor.
    pub async fn disconnect(&self) -> bool {
        supervisor::stop_connectivity_monitor(self);

        let had_connection = self.inner.connection.lock().await.take().is_some();
        self.inner.connected.store(false, Ordering::SeqCst);
        *self.inner.token.lock().expect("token lock poisoned") = None;

        if had_connection {
            info!("Connection closed");
        }
        had_connection
    }

    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        bank_name: &str,
    ) -> Result<(bool, String), ClientError> {
        let mut stub = self.stub().await?;

        let request = Request::new(AuthRequest {
            username: username.to_string(),
            password: password.to_string(),
            bank_name: bank_name.to_string(),
        });

        match stub.authenticate(request).await {
            Ok(response) => {
                let response = response.into_inner();
                if response.success {
                    *self.inner.token.lock().expect("token lock poisoned") =
                        Some(response.token.clone());
                    info!("Authentication successful");

                    // Con sesion fresca, drenar lo que haya quedado encolado
                    if self.inner.queue.has_pending() {
                        match self.retry_pending().await {
                            Ok(report) => info!("{}", report),
                            Err(e) => error!("Pending replay after login failed: {}", e),
                        }
                    }

                    Ok((true, "Authentication successful".to_string()))
                } else {
                    error!("Authentication failed: {}", response.message);
                    Ok((false, response.message))
                }
            }
            Err(status) => {
                let message = format!(
                    "RPC error during authentication: {:?} - {}",
                    status.code(),
                    status.message()
                );
                error!("{}", message);
                Ok((false, message))
            }
        }
    }

    pub async fn check_balance(&self) -> Result<(bool, String, String), ClientError> {
        let mut stub = self.stub().await?;
        let token = self.require_token()?;

        let mut request = Request::new(BalanceRequest {
            token: token.clone(),
            account_id: String::new(),
        });
        attach_token(&mut request, &token);

        match stub.check_balance(request).await {
            Ok(response) => {
                let response = response.into_inner();
                Ok((response.success, response.balance, response.message))
            }
            Err(status) => {
                let message = if status.code() == Code::PermissionDenied {
                    format!("Authorization error: {}", status.message())
                } else {
                    format!("RPC error during balance check: {:?}", status.code())
                };
                error!("{}", message);
                Ok((false, String::new(), message))
            }
        }
    }

    /// Inicia un pago. El registro durable se escribe ANTES del primer
    /// envio; solo un exito definitivo del gateway lo borra.
    pub async fn make_payment(
        &self,
        receiver_account: &str,
        receiver_bank: &str,
        amount: &str,
        fixed_id: Option<&str>,
    ) -> Result<PaymentAttempt, ClientError> {
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }
        self.require_token()?;

        // Id fijo solo para probar idempotencia desde el menu
        let payment_id = match fixed_id {
            Some(id) => {
                info!("Used fixed payment id");
                id.to_string()
            }
            None => Uuid::new_v4().to_string(),
        };

        self.inner.queue.add(
            &payment_id,
            &PendingPayment {
                receiver_account: receiver_account.to_string(),
                receiver_bank: receiver_bank.to_string(),
                amount: amount.to_string(),
                created_at: Utc::now(),
            },
        )?;

        match self
            .send_payment(&payment_id, receiver_account, receiver_bank, amount)
            .await?
        {
            SendResult::Definitive(response) => {
                if response.success {
                    self.inner.queue.remove(&payment_id);
                    info!("Payment successful: {}", response.message);
                } else {
                    error!("Payment failed: {}", response.message);
                }
                Ok(PaymentAttempt {
                    payment_id,
                    success: response.success,
                    queued: !response.success,
                    message: response.message,
                })
            }
            SendResult::Transport {
                unavailable,
                message,
            } => {
                let message = if unavailable {
                    info!("Server unavailable, payment will be retried later");
                    "Payment server is currently unavailable. Will try later".to_string()
                } else {
                    message
                };
                Ok(PaymentAttempt {
                    payment_id,
                    success: false,
                    queued: true,
                    message,
                })
            }
        }
    }

    /// Reenvia cada pago pendiente con su payment id original. Cualquier
    /// respuesta definitiva del gateway (exito, o el fallo cacheado que
    /// resuelve la idempotencia) saca el registro de la cola; los fallos
    /// de transporte lo dejan para la proxima pasada.
    pub async fn retry_pending(&self) -> Result<RetryReport, ClientError> {
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }
        self.require_token()?;

        let mut report = RetryReport {
            retried: 0,
            succeeded: 0,
        };

        for (payment_id, payment) in self.inner.queue.list() {
            info!("Retrying pending transaction: {}", payment_id);
            report.retried += 1;

            match self
                .send_payment(
                    &payment_id,
                    &payment.receiver_account,
                    &payment.receiver_bank,
                    &payment.amount,
                )
                .await?
            {
                SendResult::Definitive(response) => {
                    if response.success {
                        report.succeeded += 1;
                    } else {
                        error!(
                            "Pending transaction {} resolved as failure: {}",
                            payment_id, response.message
                        );
                    }
                    self.inner.queue.remove(&payment_id);
                }
                SendResult::Transport { .. } => {
                    // Sigue pendiente; el supervisor volvera a intentar
                }
            }
        }

        Ok(report)
    }

    async fn send_payment(
        &self,
        payment_id: &str,
        receiver_account: &str,
        receiver_bank: &str,
        amount: &str,
    ) -> Result<SendResult, ClientError> {
        let mut stub = self.stub().await?;
        let token = self.require_token()?;

        let mut request = Request::new(PaymentRequest {
            token: token.clone(),
            sender_account: "self".to_string(),
            receiver_account: receiver_account.to_string(),
            receiver_bank: receiver_bank.to_string(),
            amount: amount.to_string(),
            payment_id: payment_id.to_string(),
        });
        attach_token(&mut request, &token);

        match stub.process_payment(request).await {
            Ok(response) => Ok(SendResult::Definitive(response.into_inner())),
            Err(status) => {
                error!("RPC error during payment: {:?}", status.code());
                Ok(SendResult::Transport {
                    unavailable: is_unavailable(&status),
                    message: format!("RPC error during payment: {:?}", status.code()),
                })
            }
        }
    }

    /// Chequeo barato de salud del canal usado por el supervisor: solo un
    /// fallo de transporte cuenta como canal roto (un `unauthenticated`
    /// demuestra que el gateway respondio).
    pub(crate) async fn probe(&self) -> bool {
        let Ok(mut stub) = self.stub().await else {
            return false;
        };

        let request = Request::new(BalanceRequest {
            token: String::new(),
            account_id: String::new(),
        });

        match tokio::time::timeout(std::time::Duration::from_secs(2), stub.check_balance(request))
            .await
        {
            Err(_) => false,
            Ok(Err(status)) => !is_unavailable(&status),
            Ok(Ok(_)) => true,
        }
    }

    pub(crate) async fn reconnect(&self) {
        self.inner.connection.lock().await.take();
        self.inner.connected.store(false, Ordering::SeqCst);

        if let Err(e) = self.connect().await {
            error!("Reconnect attempt failed: {}", e);
        }
    }

    async fn stub(&self) -> Result<PaymentGatewayClient<Channel>, ClientError> {
        self.inner
            .connection
            .lock()
            .await
            .clone()
            .ok_or(ClientError::NotConnected)
    }

    fn require_token(&self) -> Result<String, ClientError> {
        self.token().ok_or(ClientError::NotAuthenticated)
    }
}

fn attach_token<T>(request: &mut Request<T>, token: &str) {
    if let Ok(value) = MetadataValue::try_from(token) {
        request.metadata_mut().insert("token", value);
    }
}

fn is_unavailable(status: &Status) -> bool {
    matches!(status.code(), Code::Unavailable | Code::DeadlineExceeded)
}
