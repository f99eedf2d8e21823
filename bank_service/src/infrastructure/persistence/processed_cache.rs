use crate::domain::error::BankError;
use crate::infrastructure::persistence::{load_json, persist_json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Resultado cacheado de una transaccion directa (no 2PC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedResult {
    pub success: bool,
    pub message: String,
}

/// Cache de idempotencia del camino directo `ProcessTransaction`, clave:
/// payment id del cliente. Distinto de la tabla de preparadas: esta cubre
/// la API simple de debito/credito que el banco tambien expone.
pub struct ProcessedTransactionCache {
    path: PathBuf,
    inner: Mutex<HashMap<String, ProcessedResult>>,
}

impl ProcessedTransactionCache {
    pub fn load(data_dir: &Path, bank_name: &str) -> Result<Self, BankError> {
        std::fs::create_dir_all(data_dir).map_err(|e| BankError::StorageError(e.to_string()))?;
        let path = data_dir.join(format!(
            "{}_processed_transactions.json",
            bank_name.to_lowercase()
        ));

        let inner: HashMap<String, ProcessedResult> = load_json(&path)?.unwrap_or_default();

        Ok(Self {
            path,
            inner: Mutex::new(inner),
        })
    }

    pub async fn get(&self, payment_id: &str) -> Option<ProcessedResult> {
        self.inner.lock().await.get(payment_id).cloned()
    }

    pub async fn put(&self, payment_id: &str, result: ProcessedResult) -> Result<(), BankError> {
        let mut inner = self.inner.lock().await;
        inner.insert(payment_id.to_string(), result);
        persist_json(&self.path, &*inner)
    }
}
