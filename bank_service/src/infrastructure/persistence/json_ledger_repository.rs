use crate::domain::entities::{Account, LedgerEntry};
use crate::domain::error::BankError;
use crate::domain::repository::LedgerRepository;
use crate::infrastructure::persistence::{load_json, persist_json};
use async_trait::async_trait;
use common::types::TransactionKind;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

/// Historial de movimientos por cuenta, append-only, un archivo JSON por
/// banco. En la primera corrida se siembra una entrada de credito inicial
/// por cuenta con su balance de apertura.
pub struct JsonLedgerRepository {
    path: PathBuf,
    entries: Mutex<HashMap<String, Vec<LedgerEntry>>>,
}

impl JsonLedgerRepository {
    pub fn load_or_seed(
        data_dir: &Path,
        bank_name: &str,
        accounts: &[Account],
    ) -> Result<Self, BankError> {
        std::fs::create_dir_all(data_dir).map_err(|e| BankError::StorageError(e.to_string()))?;
        let path = data_dir.join(format!("{}_ledger.json", bank_name.to_lowercase()));

        let entries: HashMap<String, Vec<LedgerEntry>> = match load_json(&path)? {
            Some(existing) => existing,
            None => {
                let seeded: HashMap<String, Vec<LedgerEntry>> = accounts
                    .iter()
                    .map(|account| {
                        let opening = LedgerEntry::completed(
                            TransactionKind::Credit,
                            account.balance,
                            "Bank",
                        );
                        (account.account_id.clone(), vec![opening])
                    })
                    .collect();

                persist_json(&path, &seeded)?;
                info!("Initialized transaction history for {}", bank_name);
                seeded
            }
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }
}

#[async_trait]
impl LedgerRepository for JsonLedgerRepository {
    async fn append(&self, account_id: &str, entry: LedgerEntry) -> Result<(), BankError> {
        let mut entries = self.entries.lock().await;
        entries
            .entry(account_id.to_string())
            .or_default()
            .push(entry);
        persist_json(&self.path, &*entries)
    }

    async fn recent(&self, account_id: &str, limit: usize) -> Result<Vec<LedgerEntry>, BankError> {
        let entries = self.entries.lock().await;

        let mut account_entries = entries.get(account_id).cloned().unwrap_or_default();
        account_entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        account_entries.truncate(limit);

        Ok(account_entries)
    }
}
