//! Gateway Service Library
//!
//! This library acts as the core of the payment gateway: the 2PC
//! coordinator, the session-token layer and the idempotency cache, exported
//! for the application binary and integration tests.
//!
//! # Modules
//!
//! * `api` - Contains the gRPC service surface.
//! * `config` - Environment-driven configuration and the static bank map.
//! * `domain` - Contains the domain entities and the bank gateway port.
//! * `infrastructure` - Contains the gRPC bank gateway and the stores.
//! * `use_cases` - Contains the application business logic and workflows.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod use_cases;
