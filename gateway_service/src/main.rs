use chrono::Duration as ChronoDuration;
use dotenvy::dotenv;
use gateway_service::{
    api::{
        grpc_service::PaymentGatewayService,
        proto::payment::payment_gateway_server::PaymentGatewayServer,
    },
    config::GatewayConfig,
    domain::gateways::BankGateway,
    infrastructure::{
        bank_directory::BankDirectory,
        gateways::grpc_bank_gateway::GrpcBankGateway,
        idempotency_cache::IdempotencyCache,
        token_store::{run_token_sweeper, TokenStore},
    },
    use_cases::{
        authenticate::AuthenticateUseCase, check_balance::CheckBalanceUseCase,
        get_transaction_history::GetTransactionHistoryUseCase,
        process_payment::ProcessPaymentUseCase, two_phase_transfer::TwoPhaseTransferUseCase,
    },
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

const TOKEN_TTL_HOURS: i64 = 1;
const TOKEN_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Cargar variables de entorno
    dotenv().ok();

    // 2. Configurar Logging/Tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Payment Gateway...");
    let config = GatewayConfig::from_env();

    // 3. Cargar la tabla de tokens (los vencidos se filtran al cargar)
    let tokens = Arc::new(TokenStore::load(
        config.data_dir.join("active_tokens.json"),
        ChronoDuration::hours(TOKEN_TTL_HOURS),
    )?);

    // 4. Barrido horario de tokens vencidos
    tokio::spawn(run_token_sweeper(tokens.clone(), TOKEN_SWEEP_INTERVAL));

    // 5. Directorio de bancos con canales perezosos: un banco que arranca
    //    despues sigue siendo alcanzable en el primer uso
    let bank_tls = common::tls::client_tls_config(&config.cert_dir, &config.tls_domain)?;
    let mut banks: HashMap<String, Arc<dyn BankGateway>> = HashMap::new();
    for (bank_name, address) in &config.bank_servers {
        banks.insert(
            bank_name.clone(),
            Arc::new(GrpcBankGateway::new(bank_name, address, bank_tls.clone())),
        );
    }
    let directory = Arc::new(BankDirectory::new(banks));
    info!(
        "Payment Gateway initialized with connections to {} banks",
        directory.len()
    );

    // 6. Instanciar Casos de Uso
    let idempotency = Arc::new(IdempotencyCache::new());
    let transfer = Arc::new(TwoPhaseTransferUseCase::new(
        directory.clone(),
        config.phase_timeout,
        config.abort_timeout,
    ));

    let service = PaymentGatewayService::new(
        tokens.clone(),
        AuthenticateUseCase::new(directory.clone(), tokens.clone(), config.phase_timeout),
        CheckBalanceUseCase::new(directory.clone(), config.phase_timeout),
        GetTransactionHistoryUseCase::new(directory.clone(), config.phase_timeout),
        ProcessPaymentUseCase::new(
            directory.clone(),
            idempotency,
            transfer,
            config.phase_timeout,
        ),
    );

    // 7. Servidor gRPC con TLS mutuo
    let tls = common::tls::server_tls_config(&config.cert_dir)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("Payment Gateway started securely at {}", addr);

    tonic::transport::Server::builder()
        .tls_config(tls)?
        .add_service(PaymentGatewayServer::new(service))
        .serve_with_shutdown(addr, async {
            tokio::signal::ctrl_c().await.ok();
            info!("Payment Gateway shutting down...");
        })
        .await?;

    Ok(())
}
