use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub gateway_addr: String,
    pub cert_dir: PathBuf,
    pub tls_domain: String,
    pub pending_dir: PathBuf,
    pub check_interval: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let check_interval = env::var("CHECK_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        Self {
            gateway_addr: env::var("GATEWAY_ADDR")
                .unwrap_or_else(|_| "https://localhost:50051".to_string()),
            cert_dir: PathBuf::from(
                env::var("CERT_DIR").unwrap_or_else(|_| "certificate".to_string()),
            ),
            tls_domain: env::var("TLS_DOMAIN").unwrap_or_else(|_| "localhost".to_string()),
            pending_dir: PathBuf::from(
                env::var("PENDING_DIR").unwrap_or_else(|_| "pending_payments".to_string()),
            ),
            check_interval,
        }
    }
}
