use crate::domain::entities::Account;
use crate::domain::error::BankError;
use crate::domain::repository::AccountRepository;
use crate::infrastructure::persistence::{load_json, persist_json};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

/// Repositorio de cuentas respaldado por un archivo JSON por banco.
///
/// El mapa completo vive en memoria bajo un unico lock y se persiste tras
/// cada mutacion. El lock grueso tambien serializa los commits por cuenta.
pub struct JsonAccountRepository {
    path: PathBuf,
    accounts: Mutex<HashMap<String, Account>>,
}

impl JsonAccountRepository {
    /// Carga el archivo de cuentas del banco, o lo inicializa con los
    /// usuarios de muestra si es la primera vez que el banco arranca.
    pub fn load_or_seed(data_dir: &Path, bank_name: &str) -> Result<Self, BankError> {
        std::fs::create_dir_all(data_dir).map_err(|e| BankError::StorageError(e.to_string()))?;
        let path = data_dir.join(format!("{}_accounts.json", bank_name.to_lowercase()));

        let accounts: HashMap<String, Account> = match load_json(&path)? {
            Some(existing) => existing,
            None => {
                let seeded = Self::sample_accounts();
                persist_json(&path, &seeded)?;
                info!("Created sample account data for {}", bank_name);
                seeded
            }
        };

        info!(
            "Bank {} initialized with {} accounts",
            bank_name,
            accounts.len()
        );

        Ok(Self {
            path,
            accounts: Mutex::new(accounts),
        })
    }

    // user1..user5 con ACC001..ACC005 y balances 1000*i, igual que el
    // aprovisionamiento inicial de cada banco.
    fn sample_accounts() -> HashMap<String, Account> {
        (1..=5)
            .map(|i| {
                let account = Account::new(
                    &format!("ACC{:03}", i),
                    &format!("user{}", i),
                    &format!("pass{}", i),
                    &format!("User {}", i),
                    Decimal::from(1000 * i),
                );
                (account.username.clone(), account)
            })
            .collect()
    }

    /// Snapshot de todas las cuentas (para sembrar el ledger inicial).
    pub async fn all(&self) -> Vec<Account> {
        self.accounts.lock().await.values().cloned().collect()
    }
}

#[async_trait]
impl AccountRepository for JsonAccountRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, BankError> {
        Ok(self.accounts.lock().await.get(username).cloned())
    }

    async fn find_by_account_id(&self, account_id: &str) -> Result<Option<Account>, BankError> {
        Ok(self
            .accounts
            .lock()
            .await
            .values()
            .find(|a| a.account_id == account_id)
            .cloned())
    }

    async fn apply_delta(&self, account_id: &str, delta: Decimal) -> Result<Decimal, BankError> {
        let mut accounts = self.accounts.lock().await;

        let account = accounts
            .values_mut()
            .find(|a| a.account_id == account_id)
            .ok_or_else(|| BankError::AccountNotFound(account_id.to_string()))?;

        let new_balance = account.balance + delta;
        if new_balance < Decimal::ZERO {
            return Err(BankError::InsufficientFunds {
                account_id: account_id.to_string(),
                balance: account.balance,
            });
        }

        account.balance = new_balance;
        persist_json(&self.path, &*accounts)?;

        Ok(new_balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_seed_creates_five_accounts() {
        let dir = tempdir().unwrap();
        let repo = JsonAccountRepository::load_or_seed(dir.path(), "Bank1").unwrap();

        let user1 = repo.find_by_username("user1").await.unwrap().unwrap();
        assert_eq!(user1.account_id, "ACC001");
        assert_eq!(user1.balance, Decimal::from(1000));

        let user5 = repo.find_by_account_id("ACC005").await.unwrap().unwrap();
        assert_eq!(user5.username, "user5");
        assert_eq!(user5.balance, Decimal::from(5000));
    }

    #[tokio::test]
    async fn test_apply_delta_persists_across_reload() {
        let dir = tempdir().unwrap();

        {
            let repo = JsonAccountRepository::load_or_seed(dir.path(), "Bank1").unwrap();
            let new_balance = repo
                .apply_delta("ACC001", Decimal::from(-250))
                .await
                .unwrap();
            assert_eq!(new_balance, Decimal::from(750));
        }

        // Reabrimos el mismo directorio: el balance debe sobrevivir
        let repo = JsonAccountRepository::load_or_seed(dir.path(), "Bank1").unwrap();
        let account = repo.find_by_account_id("ACC001").await.unwrap().unwrap();
        assert_eq!(account.balance, Decimal::from(750));
    }

    #[tokio::test]
    async fn test_apply_delta_never_goes_negative() {
        let dir = tempdir().unwrap();
        let repo = JsonAccountRepository::load_or_seed(dir.path(), "Bank1").unwrap();

        let result = repo.apply_delta("ACC001", Decimal::from(-1001)).await;

        match result {
            Err(BankError::InsufficientFunds { balance, .. }) => {
                assert_eq!(balance, Decimal::from(1000));
            }
            other => panic!("Expected InsufficientFunds, got {:?}", other),
        }

        // El balance no debe haber cambiado
        let account = repo.find_by_account_id("ACC001").await.unwrap().unwrap();
        assert_eq!(account.balance, Decimal::from(1000));
    }

    #[tokio::test]
    async fn test_apply_delta_unknown_account() {
        let dir = tempdir().unwrap();
        let repo = JsonAccountRepository::load_or_seed(dir.path(), "Bank1").unwrap();

        let result = repo.apply_delta("ACC999", Decimal::from(10)).await;
        assert_eq!(
            result.unwrap_err(),
            BankError::AccountNotFound("ACC999".to_string())
        );
    }
}
