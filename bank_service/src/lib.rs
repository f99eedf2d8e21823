//! Bank Service Library
//!
//! This library acts as the core of a bank participant, exporting the
//! necessary modules for the application binary and integration tests.
//!
//! # Modules
//!
//! * `api` - Contains the gRPC service surface.
//! * `config` - Environment-driven configuration.
//! * `domain` - Contains the domain entities and business rules.
//! * `infrastructure` - Contains the concrete implementations of the stores.
//! * `use_cases` - Contains the application business logic and workflows.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod use_cases;
