use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuracion del gateway. El mapa de bancos es estatico: dos bancos
/// locales por default, o lo que diga `BANK_SERVERS` con el formato
/// `Bank1=https://localhost:50052,Bank2=https://localhost:50053`.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub cert_dir: PathBuf,
    pub tls_domain: String,
    pub bank_servers: HashMap<String, String>,
    pub phase_timeout: Duration,
    pub abort_timeout: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let port = env::var("GATEWAY_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(50051);

        let phase_timeout = env::var("TPC_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        let bank_servers = env::var("BANK_SERVERS")
            .map(|raw| Self::parse_bank_servers(&raw))
            .unwrap_or_else(|_| Self::default_bank_servers());

        Self {
            port,
            data_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string())),
            cert_dir: PathBuf::from(
                env::var("CERT_DIR").unwrap_or_else(|_| "certificate".to_string()),
            ),
            tls_domain: env::var("TLS_DOMAIN").unwrap_or_else(|_| "localhost".to_string()),
            bank_servers,
            phase_timeout,
            // Los aborts nunca bloquean el resultado visible: timeout corto fijo
            abort_timeout: Duration::from_secs(2),
        }
    }

    fn default_bank_servers() -> HashMap<String, String> {
        HashMap::from([
            ("Bank1".to_string(), "https://localhost:50052".to_string()),
            ("Bank2".to_string(), "https://localhost:50053".to_string()),
        ])
    }

    fn parse_bank_servers(raw: &str) -> HashMap<String, String> {
        raw.split(',')
            .filter_map(|pair| {
                let (name, addr) = pair.split_once('=')?;
                Some((name.trim().to_string(), addr.trim().to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bank_servers() {
        let parsed = GatewayConfig::parse_bank_servers(
            "Bank1=https://localhost:50052, Bank2=https://localhost:50053",
        );

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["Bank2"], "https://localhost:50053");
    }
}
