use chrono::{DateTime, Utc};
use common::types::TransactionKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Modelo de Entidad: Account.
/// Una cuenta pertenece a un usuario del banco y nunca puede quedar con
/// balance negativo.
///
/// # Examples
/// ```
/// use bank_service::domain::entities::Account;
/// use rust_decimal::Decimal;
///
/// let account = Account::new("ACC001", "user1", "pass1", "User 1", Decimal::from(1000));
/// assert_eq!(account.account_id, "ACC001");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub username: String,
    pub password: String,
    pub name: String,
    pub balance: Decimal,
}

impl Account {
    pub fn new(
        account_id: &str,
        username: &str,
        password: &str,
        name: &str,
        balance: Decimal,
    ) -> Self {
        Self {
            account_id: account_id.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            balance,
        }
    }
}

/// Registro inmutable del historial de una cuenta. El `transaction_id`
/// coincide con el id de participante 2PC cuando la entrada proviene de un
/// commit, y es un UUID fresco en el camino directo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub transaction_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub counterparty: String,
    pub timestamp: DateTime<Utc>,
    pub status: String,
}

impl LedgerEntry {
    /// Crea una entrada ya completada con un id generado.
    pub fn completed(kind: TransactionKind, amount: Decimal, counterparty: &str) -> Self {
        Self::completed_with_id(&Uuid::new_v4().to_string(), kind, amount, counterparty)
    }

    pub fn completed_with_id(
        transaction_id: &str,
        kind: TransactionKind,
        amount: Decimal,
        counterparty: &str,
    ) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            kind,
            amount,
            counterparty: counterparty.to_string(),
            timestamp: Utc::now(),
            status: "completed".to_string(),
        }
    }
}

/// Transaccion preparada (lado participante del 2PC).
///
/// Existe solo entre un `Prepare` exitoso y su `Commit`/`Abort`. Solo se
/// almacenan votos afirmativos: un Prepare que falla la guarda no deja
/// entrada, y un Prepare repetido devuelve el voto almacenado tal cual.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTransaction {
    pub transaction_id: String,
    pub account_id: String,
    pub username: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub counterparty: String,
    pub prepared_at: DateTime<Utc>,
    pub ready: bool,
    pub message: String,
}

/// Voto devuelto por la fase Prepare.
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareVote {
    pub ready: bool,
    pub message: String,
}

impl PrepareVote {
    pub fn yes(message: &str) -> Self {
        Self {
            ready: true,
            message: message.to_string(),
        }
    }

    pub fn no(message: String) -> Self {
        Self {
            ready: false,
            message,
        }
    }
}

/// Resultado de la fase Commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitAck {
    pub success: bool,
    pub message: String,
}

/// Resultado de la fase Abort. Abortar un id desconocido es un exito:
/// el coordinador puede reintentar aborts sin efectos secundarios.
#[derive(Debug, Clone, PartialEq)]
pub struct AbortAck {
    pub success: bool,
    pub message: String,
}
