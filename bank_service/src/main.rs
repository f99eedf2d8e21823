use bank_service::{
    api::{grpc_service::BankGrpcService, proto::payment::bank_service_server::BankServiceServer},
    config::BankConfig,
    infrastructure::{
        persistence::{
            json_account_repository::JsonAccountRepository,
            json_ledger_repository::JsonLedgerRepository,
            processed_cache::ProcessedTransactionCache,
        },
        prepared_store::PreparedTransactionStore,
    },
    use_cases::{
        abort_transaction::AbortTransactionUseCase, commit_transaction::CommitTransactionUseCase,
        get_balance::GetBalanceUseCase, get_transaction_history::GetTransactionHistoryUseCase,
        prepare_transaction::PrepareTransactionUseCase,
        process_transaction::ProcessTransactionUseCase,
        verify_credentials::VerifyCredentialsUseCase,
    },
};
use clap::Parser;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "bank_service", about = "Bank participant server")]
struct Cli {
    /// Nombre del banco (ej: Bank1)
    bank_name: String,
    /// Puerto de escucha del servidor gRPC
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Cargar variables de entorno y argumentos
    dotenv().ok();
    let cli = Cli::parse();

    // 2. Configurar Logging/Tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = BankConfig::from_env(cli.bank_name, cli.port);
    info!("Starting Bank Server {}...", config.bank_name);

    // 3. Cargar estado persistido (o sembrar datos de muestra)
    let accounts = Arc::new(JsonAccountRepository::load_or_seed(
        &config.data_dir,
        &config.bank_name,
    )?);
    let seeded_accounts = accounts.all().await;
    let ledger = Arc::new(JsonLedgerRepository::load_or_seed(
        &config.data_dir,
        &config.bank_name,
        &seeded_accounts,
    )?);
    let processed = Arc::new(ProcessedTransactionCache::load(
        &config.data_dir,
        &config.bank_name,
    )?);
    let prepared = Arc::new(PreparedTransactionStore::new());

    // 4. Instanciar Casos de Uso
    let service = BankGrpcService::new(
        VerifyCredentialsUseCase::new(accounts.clone()),
        GetBalanceUseCase::new(accounts.clone()),
        GetTransactionHistoryUseCase::new(accounts.clone(), ledger.clone()),
        ProcessTransactionUseCase::new(accounts.clone(), ledger.clone(), processed.clone()),
        PrepareTransactionUseCase::new(accounts.clone(), prepared.clone()),
        CommitTransactionUseCase::new(accounts.clone(), ledger.clone(), prepared.clone()),
        AbortTransactionUseCase::new(prepared.clone()),
    );

    // 5. Configurar Servidor gRPC con TLS mutuo
    let tls = common::tls::server_tls_config(&config.cert_dir)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!(
        "Bank Server {} started securely at {}",
        config.bank_name, addr
    );

    let bank_name = config.bank_name.clone();
    tonic::transport::Server::builder()
        .tls_config(tls)?
        .add_service(BankServiceServer::new(service))
        .serve_with_shutdown(addr, async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Bank Server {} shutting down...", bank_name);
        })
        .await?;

    Ok(())
}
