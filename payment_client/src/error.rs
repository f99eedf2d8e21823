use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not connected to the server")]
    NotConnected,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Failed to connect: {0}")]
    ConnectionFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Tls(#[from] common::tls::TlsError),
}
