//! # Foo Service
//!
//! CRUD service for `Foo` resources scoped by organization and namespace,
//! exposed over HTTP.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Foo entity, repository contracts and the error taxonomy
//! - **application**: `FooService` and its outbound ports (clock, ids)
//! - **infrastructure**: SeaORM and in-memory repositories, system adapters
//! - **interfaces**: REST API with problem responses and Swagger documentation
//! - **shared**: list query contract, pagination and shutdown primitives
//! - **server**: runtime wiring used by the CLI

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig, BuildInfo};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;
