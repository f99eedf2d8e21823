//! Common Library
//!
//! Vocabulario compartido entre el gateway, los bancos y el cliente:
//! tipos de transaccion, estados de pago, parsing de montos y la carga
//! de credenciales TLS mutuas.

pub mod money;
pub mod tls;
pub mod types;
