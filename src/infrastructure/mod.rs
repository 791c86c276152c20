//! Infrastructure layer - external concerns

pub mod database;
pub mod storage;
pub mod system;

pub use database::{init_database, DatabaseConfig, SeaOrmFooRepository};
pub use storage::InMemoryFooRepository;
pub use system::{SystemClock, UuidGenerator};
