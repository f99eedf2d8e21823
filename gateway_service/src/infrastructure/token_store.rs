use crate::domain::entities::SessionToken;
use crate::domain::error::GatewayError;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

/// Tabla de tokens activos del gateway, persistida tras cada mutacion.
///
/// Al cargar se filtran los vencidos, y un barrido periodico (una vez por
/// hora) vuelve a filtrar y re-persiste. `validate` rechaza tokens
/// vencidos aunque sigan fisicamente en el mapa.
pub struct TokenStore {
    path: PathBuf,
    ttl: Duration,
    inner: Mutex<HashMap<String, SessionToken>>,
}

impl TokenStore {
    pub fn load(path: PathBuf, ttl: Duration) -> Result<Self, GatewayError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GatewayError::Storage(e.to_string()))?;
        }

        let mut tokens: HashMap<String, SessionToken> = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| GatewayError::Storage(e.to_string()))?;
            serde_json::from_str(&raw).map_err(|e| GatewayError::Storage(e.to_string()))?
        } else {
            HashMap::new()
        };

        tokens.retain(|_, info| !info.is_expired());
        info!("Loaded {} active tokens from storage", tokens.len());

        Ok(Self {
            path,
            ttl,
            inner: Mutex::new(tokens),
        })
    }

    /// Emite un token opaco `<username>-<uuid>` ligado a una cuenta, con
    /// vencimiento absoluto `now + ttl`, y persiste la tabla.
    pub fn mint(
        &self,
        username: &str,
        bank: &str,
        account_id: &str,
    ) -> Result<SessionToken, GatewayError> {
        let session = SessionToken {
            token: format!("{}-{}", username, Uuid::new_v4()),
            username: username.to_string(),
            bank: bank.to_string(),
            account_id: account_id.to_string(),
            expires_at: Utc::now() + self.ttl,
        };

        let mut tokens = self.inner.lock().expect("token store lock poisoned");
        tokens.insert(session.token.clone(), session.clone());
        self.save(&tokens)?;

        Ok(session)
    }

    /// Devuelve la sesion solo si el token existe y no esta vencido.
    pub fn validate(&self, token: &str) -> Option<SessionToken> {
        let tokens = self.inner.lock().expect("token store lock poisoned");
        tokens.get(token).filter(|info| !info.is_expired()).cloned()
    }

    /// Barrido periodico: elimina vencidos y re-persiste si hubo cambios.
    pub fn sweep_expired(&self) -> Result<usize, GatewayError> {
        let mut tokens = self.inner.lock().expect("token store lock poisoned");

        let before = tokens.len();
        tokens.retain(|_, info| !info.is_expired());
        let expired = before - tokens.len();

        if expired > 0 {
            info!("Cleaned up {} expired tokens", expired);
            self.save(&tokens)?;
        }

        Ok(expired)
    }

    fn save(&self, tokens: &HashMap<String, SessionToken>) -> Result<(), GatewayError> {
        let json = serde_json::to_string_pretty(tokens)
            .map_err(|e| GatewayError::Storage(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|e| GatewayError::Storage(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| GatewayError::Storage(e.to_string()))?;

        info!("Saved {} active tokens to storage", tokens.len());
        Ok(())
    }
}

/// Tarea de fondo que barre los tokens vencidos cada `interval`.
pub async fn run_token_sweeper(
    tokens: std::sync::Arc<TokenStore>,
    interval: std::time::Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    // El primer tick es inmediato y el arranque ya filtro; lo saltamos
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if let Err(e) = tokens.sweep_expired() {
            error!("Token cleanup failed: {}", e);
        }
    }
}
