//! Database repository implementations

pub mod foo_repository;

pub use foo_repository::SeaOrmFooRepository;
