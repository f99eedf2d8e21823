use crate::domain::gateways::BankGateway;
use std::collections::HashMap;
use std::sync::Arc;

/// Mapa estatico nombre de banco -> gateway. Los canales subyacentes son
/// perezosos: registrar un banco aqui no abre ninguna conexion.
pub struct BankDirectory {
    banks: HashMap<String, Arc<dyn BankGateway>>,
}

impl BankDirectory {
    pub fn new(banks: HashMap<String, Arc<dyn BankGateway>>) -> Self {
        Self { banks }
    }

    pub fn get(&self, bank_name: &str) -> Option<Arc<dyn BankGateway>> {
        self.banks.get(bank_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}
