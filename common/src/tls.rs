use std::path::Path;
use thiserror::Error;
use tonic::transport::{Certificate, ClientTlsConfig, Identity, ServerTlsConfig};

// Los tres binarios comparten la misma CA: el gateway y los bancos presentan
// server.pem/server.key, el cliente (y el gateway cuando llama a los bancos)
// presenta client.pem/client.key. Ambos lados exigen el certificado del otro.

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("Failed to read TLS material {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },
}

fn read_pem(dir: &Path, file: &str) -> Result<Vec<u8>, TlsError> {
    let path = dir.join(file);
    std::fs::read(&path).map_err(|source| TlsError::ReadFile {
        path: path.display().to_string(),
        source,
    })
}

/// Configuracion TLS para un servidor (gateway o banco): presenta la
/// identidad propia y exige certificado de cliente firmado por la CA.
pub fn server_tls_config(cert_dir: &Path) -> Result<ServerTlsConfig, TlsError> {
    let cert = read_pem(cert_dir, "server.pem")?;
    let key = read_pem(cert_dir, "server.key")?;
    let ca = read_pem(cert_dir, "ca.pem")?;

    Ok(ServerTlsConfig::new()
        .identity(Identity::from_pem(cert, key))
        .client_ca_root(Certificate::from_pem(ca)))
}

/// Configuracion TLS para un canal saliente autenticado con certificado de
/// cliente. `domain` debe coincidir con el CN/SAN del certificado del peer.
pub fn client_tls_config(cert_dir: &Path, domain: &str) -> Result<ClientTlsConfig, TlsError> {
    let cert = read_pem(cert_dir, "client.pem")?;
    let key = read_pem(cert_dir, "client.key")?;
    let ca = read_pem(cert_dir, "ca.pem")?;

    Ok(ClientTlsConfig::new()
        .ca_certificate(Certificate::from_pem(ca))
        .identity(Identity::from_pem(cert, key))
        .domain_name(domain))
}
