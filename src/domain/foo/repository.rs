//! Foo repository interfaces
//!
//! Reads go straight through [`FooRepository`]. Writes happen inside a
//! [`FooUnitOfWork`] obtained from [`FooRepository::begin`]; dropping a unit
//! of work without calling [`FooUnitOfWork::commit`] discards its changes.

use async_trait::async_trait;

use super::model::{Foo, FooFilter};
use crate::domain::DomainResult;
use crate::shared::ListResult;

#[async_trait]
pub trait FooRepository: Send + Sync {
    /// Open a transactional unit of work.
    async fn begin(&self) -> DomainResult<Box<dyn FooUnitOfWork>>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Foo>>;

    /// Matching page plus the total number of matches before pagination.
    async fn list(&self, filter: &FooFilter) -> DomainResult<ListResult<Foo>>;

    /// Cheap liveness probe for the health endpoint.
    async fn ping(&self) -> DomainResult<()>;
}

#[async_trait]
pub trait FooUnitOfWork: Send {
    async fn find_by_id(&mut self, id: &str) -> DomainResult<Option<Foo>>;

    /// Fails with `Conflict` if the id is already taken.
    async fn insert(&mut self, foo: &Foo) -> DomainResult<()>;

    /// Writes `foo` only if the stored version still equals
    /// `expected_version`; otherwise fails with `Conflict`.
    async fn update(&mut self, foo: &Foo, expected_version: i64) -> DomainResult<()>;

    /// Fails with `NotFound` if nothing was removed.
    async fn delete(&mut self, id: &str) -> DomainResult<()>;

    async fn commit(self: Box<Self>) -> DomainResult<()>;
}
