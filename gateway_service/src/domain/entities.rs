use chrono::{DateTime, Utc};
use common::types::{PaymentStatus, TransactionKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Token de sesion emitido tras verificar credenciales contra el banco
/// dueño de la cuenta. Un token identifica exactamente una cuenta y expira
/// en un instante absoluto: un token vencido se rechaza aunque siga
/// presente en disco.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
    pub username: String,
    pub bank: String,
    pub account_id: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Resultado de un pago visto por el cliente. Es el valor que se cachea en
/// la capa de idempotencia cuando el desenlace es terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    pub success: bool,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub message: String,
}

impl PaymentOutcome {
    pub fn completed(transaction_id: &str, message: &str) -> Self {
        Self {
            success: true,
            transaction_id: transaction_id.to_string(),
            status: PaymentStatus::Completed,
            message: message.to_string(),
        }
    }

    pub fn failed(transaction_id: &str, message: String) -> Self {
        Self {
            success: false,
            transaction_id: transaction_id.to_string(),
            status: PaymentStatus::Failed,
            message,
        }
    }

    /// Estado critico: el emisor committeo pero el receptor no confirmo.
    pub fn critical(transaction_id: &str, message: String) -> Self {
        Self {
            success: false,
            transaction_id: transaction_id.to_string(),
            status: PaymentStatus::Error,
            message,
        }
    }
}

// Respuestas de los bancos, ya traducidas al dominio del gateway.

#[derive(Debug, Clone, PartialEq)]
pub struct CredentialCheck {
    pub valid: bool,
    pub account_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReply {
    pub success: bool,
    pub balance: Decimal,
    pub message: String,
}

/// Movimiento tal como lo reporta el banco; el gateway no lo interpreta,
/// solo lo reenvia al cliente.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub transaction_id: String,
    pub kind: String,
    pub amount: String,
    pub counterparty: String,
    pub timestamp: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryReply {
    pub success: bool,
    pub transactions: Vec<HistoryRecord>,
    pub message: String,
}

/// Solicitud de Prepare hacia un participante del 2PC.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantPrepare {
    pub transaction_id: String,
    pub account_id: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub counterparty: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrepareVote {
    pub ready: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitAck {
    pub success: bool,
    pub message: String,
}
