use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Storage error: {0}")]
    Storage(String),
}
