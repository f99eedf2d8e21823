use crate::domain::entities::PreparedTransaction;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Tabla de transacciones preparadas, solo en memoria.
///
/// Un crash del banco en estado prepared equivale a un voto NO al
/// reiniciar: el Commit de un id que ya no esta devuelve un fallo
/// estructurado y el coordinador lo trata segun la fase en que este.
pub struct PreparedTransactionStore {
    inner: Mutex<HashMap<String, PreparedTransaction>>,
}

impl PreparedTransactionStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, transaction_id: &str) -> Option<PreparedTransaction> {
        self.inner.lock().await.get(transaction_id).cloned()
    }

    pub async fn insert(&self, tx: PreparedTransaction) {
        self.inner
            .lock()
            .await
            .insert(tx.transaction_id.clone(), tx);
    }

    pub async fn remove(&self, transaction_id: &str) -> Option<PreparedTransaction> {
        self.inner.lock().await.remove(transaction_id)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

impl Default for PreparedTransactionStore {
    fn default() -> Self {
        Self::new()
    }
}
