//! Domain layer: entities, repository contracts and errors.

pub mod error;
pub mod foo;

pub use error::{DomainError, DomainResult, ErrorKind};
pub use foo::{
    CreateFooInput, Foo, FooFilter, FooListParams, FooRepository, FooUnitOfWork, UpdateFooInput,
};
