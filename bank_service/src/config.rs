use std::env;
use std::path::PathBuf;

/// Configuracion del banco: nombre y puerto llegan por linea de comandos,
/// el resto por variables de entorno con defaults razonables.
#[derive(Debug, Clone)]
pub struct BankConfig {
    pub bank_name: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub cert_dir: PathBuf,
}

impl BankConfig {
    pub fn from_env(bank_name: String, port: u16) -> Self {
        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let cert_dir = env::var("CERT_DIR").unwrap_or_else(|_| "certificate".to_string());

        Self {
            bank_name,
            port,
            data_dir: PathBuf::from(data_dir),
            cert_dir: PathBuf::from(cert_dir),
        }
    }
}
