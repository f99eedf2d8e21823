//! Payment Client Library
//!
//! Cliente interactivo del gateway de pagos: cola durable de pagos
//! pendientes, supervisor de conectividad en segundo plano y el stub gRPC
//! con TLS mutuo.

pub mod client;
pub mod config;
pub mod error;
pub mod pending;
pub mod supervisor;

pub mod proto {
    pub mod payment {
        tonic::include_proto!("payment");
    }
}
