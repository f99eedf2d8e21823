pub mod bank_directory;
pub mod gateways;
pub mod idempotency_cache;
pub mod token_store;
