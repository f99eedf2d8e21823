pub mod persistence;
pub mod prepared_store;
