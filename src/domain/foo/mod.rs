//! Foo aggregate
//!
//! Contains the Foo entity, its service inputs and the repository contract.

pub mod model;
pub mod repository;

pub use model::{CreateFooInput, Foo, FooFilter, FooListParams, UpdateFooInput};
pub use repository::{FooRepository, FooUnitOfWork};
