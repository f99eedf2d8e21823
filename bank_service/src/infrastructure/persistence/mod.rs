pub mod json_account_repository;
pub mod json_ledger_repository;
pub mod processed_cache;

use crate::domain::error::BankError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

// Escritura atomica: primero a un archivo temporal y despues rename, para
// que un crash a mitad de escritura no deje un JSON truncado.
pub(crate) fn persist_json<T: Serialize>(path: &Path, value: &T) -> Result<(), BankError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| BankError::StorageError(e.to_string()))?;

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json).map_err(|e| BankError::StorageError(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| BankError::StorageError(e.to_string()))?;

    Ok(())
}

pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, BankError> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path).map_err(|e| BankError::StorageError(e.to_string()))?;
    let value = serde_json::from_str(&raw).map_err(|e| BankError::StorageError(e.to_string()))?;
    Ok(Some(value))
}
