pub mod abort_transaction;
pub mod commit_transaction;
pub mod get_balance;
pub mod get_transaction_history;
pub mod prepare_transaction;
pub mod process_transaction;
pub mod verify_credentials;
