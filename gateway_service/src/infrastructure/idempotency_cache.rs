use crate::domain::entities::PaymentOutcome;
use std::collections::HashMap;
use std::sync::Mutex;

/// Cache de resultados por payment id (la clave de idempotencia que manda
/// el cliente).
///
/// Solo se escriben desenlaces terminales: exito, fallo no reintentable o
/// el estado critico `error`. Los fallos transitorios (banco inalcanzable,
/// deadline) no se cachean para que un reintento pueda progresar.
pub struct IdempotencyCache {
    inner: Mutex<HashMap<String, PaymentOutcome>>,
}

impl IdempotencyCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, payment_id: &str) -> Option<PaymentOutcome> {
        self.inner
            .lock()
            .expect("idempotency cache lock poisoned")
            .get(payment_id)
            .cloned()
    }

    pub fn put(&self, payment_id: &str, outcome: PaymentOutcome) {
        self.inner
            .lock()
            .expect("idempotency cache lock poisoned")
            .insert(payment_id.to_string(), outcome);
    }
}

impl Default for IdempotencyCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_returns_stored_outcome_verbatim() {
        let cache = IdempotencyCache::new();
        let outcome = PaymentOutcome::completed("gtx-1", "Payment processed successfully");

        cache.put("p-1", outcome.clone());

        assert_eq!(cache.get("p-1"), Some(outcome));
        assert_eq!(cache.get("p-2"), None);
    }
}
