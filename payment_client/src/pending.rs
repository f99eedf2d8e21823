use crate::error::ClientError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info};

/// Registro durable de un pago aun no confirmado por el gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPayment {
    pub receiver_account: String,
    pub receiver_bank: String,
    pub amount: String,
    pub created_at: DateTime<Utc>,
}

/// Cola durable de pagos pendientes: un archivo JSON por payment id bajo
/// el directorio del cliente.
///
/// El registro se escribe ANTES del primer envio y se borra recien cuando
/// el gateway da una respuesta definitiva. Como cada pago es su propio
/// archivo, el supervisor y el hilo de usuario no compiten mas que por la
/// membresia de la cola (releer un pago recien borrado es un no-op).
pub struct PendingQueue {
    dir: PathBuf,
}

impl PendingQueue {
    /// `client_id` particiona las colas en disco; es un id fresco por
    /// instancia de cliente, sin significado de autenticacion.
    pub fn new(base_dir: &std::path::Path, client_id: &str) -> Result<Self, ClientError> {
        let dir = base_dir.join(client_id);
        std::fs::create_dir_all(&dir).map_err(|e| ClientError::Storage(e.to_string()))?;
        Ok(Self { dir })
    }

    pub fn add(&self, payment_id: &str, payment: &PendingPayment) -> Result<(), ClientError> {
        let json =
            serde_json::to_string_pretty(payment).map_err(|e| ClientError::Storage(e.to_string()))?;
        std::fs::write(self.path_for(payment_id), json)
            .map_err(|e| ClientError::Storage(e.to_string()))?;

        info!("Added transaction to pending queue: {}", payment_id);
        Ok(())
    }

    pub fn remove(&self, payment_id: &str) {
        let path = self.path_for(payment_id);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                error!("Failed to remove pending transaction {}: {}", payment_id, e);
            } else {
                info!("Removed transaction from pending queue: {}", payment_id);
            }
        }
    }

    /// Pagos pendientes con su payment id. Los archivos ilegibles se
    /// loguean y se saltan.
    pub fn list(&self) -> Vec<(String, PendingPayment)> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return vec![],
        };

        let mut pending = vec![];
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(payment_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
            {
                Ok(payment) => pending.push((payment_id.to_string(), payment)),
                Err(e) => error!("Error reading pending transaction {:?}: {}", path, e),
            }
        }

        pending
    }

    pub fn has_pending(&self) -> bool {
        !self.list().is_empty()
    }

    fn path_for(&self, payment_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", payment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> PendingPayment {
        PendingPayment {
            receiver_account: "ACC002".to_string(),
            receiver_bank: "Bank2".to_string(),
            amount: "100".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_list_remove_round_trip() {
        let dir = tempdir().unwrap();
        let queue = PendingQueue::new(dir.path(), "client-1").unwrap();

        assert!(!queue.has_pending());

        queue.add("p-1", &sample()).unwrap();
        queue.add("p-2", &sample()).unwrap();

        let mut listed = queue.list();
        listed.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].0, "p-1");
        assert_eq!(listed[0].1.receiver_bank, "Bank2");

        queue.remove("p-1");
        assert_eq!(queue.list().len(), 1);

        // Remover algo ya removido es inofensivo
        queue.remove("p-1");
    }

    #[test]
    fn test_queues_are_partitioned_by_client_id() {
        let dir = tempdir().unwrap();
        let queue_a = PendingQueue::new(dir.path(), "client-a").unwrap();
        let queue_b = PendingQueue::new(dir.path(), "client-b").unwrap();

        queue_a.add("p-1", &sample()).unwrap();

        assert!(queue_a.has_pending());
        assert!(!queue_b.has_pending());
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = tempdir().unwrap();
        let queue = PendingQueue::new(dir.path(), "client-1").unwrap();

        queue.add("p-1", &sample()).unwrap();
        std::fs::write(dir.path().join("client-1").join("broken.json"), "{oops").unwrap();

        let listed = queue.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].0, "p-1");
    }
}
