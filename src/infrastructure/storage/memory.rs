//! In-memory Foo repository for development and testing

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::foo::model::FOO_ENTITY;
use crate::domain::{DomainError, DomainResult, Foo, FooFilter, FooRepository, FooUnitOfWork};
use crate::shared::ListResult;

/// In-memory storage keyed by Foo id
#[derive(Clone, Default)]
pub struct InMemoryFooRepository {
    rows: Arc<DashMap<String, Foo>>,
}

impl InMemoryFooRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl FooRepository for InMemoryFooRepository {
    async fn begin(&self) -> DomainResult<Box<dyn FooUnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork {
            rows: self.rows.clone(),
            pending: Vec::new(),
        }))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Foo>> {
        Ok(self.rows.get(id).map(|r| r.value().clone()))
    }

    async fn list(&self, filter: &FooFilter) -> DomainResult<ListResult<Foo>> {
        let mut matched: Vec<Foo> = self
            .rows
            .iter()
            .filter(|r| filter.matches(r.value()))
            .map(|r| r.value().clone())
            .collect();

        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect();

        Ok(ListResult::new(items, total))
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}

enum PendingWrite {
    Insert(Foo),
    Update { foo: Foo, expected_version: i64 },
    Delete(String),
}

impl PendingWrite {
    fn id(&self) -> &str {
        match self {
            Self::Insert(foo) | Self::Update { foo, .. } => &foo.id,
            Self::Delete(id) => id,
        }
    }
}

/// Buffers writes until commit. Each write is applied under its entry lock,
/// so version checks and replacement happen atomically per row.
struct InMemoryUnitOfWork {
    rows: Arc<DashMap<String, Foo>>,
    pending: Vec<PendingWrite>,
}

#[async_trait]
impl FooUnitOfWork for InMemoryUnitOfWork {
    async fn find_by_id(&mut self, id: &str) -> DomainResult<Option<Foo>> {
        // read-your-writes
        if let Some(write) = self.pending.iter().rev().find(|w| w.id() == id) {
            return Ok(match write {
                PendingWrite::Insert(foo) | PendingWrite::Update { foo, .. } => Some(foo.clone()),
                PendingWrite::Delete(_) => None,
            });
        }
        Ok(self.rows.get(id).map(|r| r.value().clone()))
    }

    async fn insert(&mut self, foo: &Foo) -> DomainResult<()> {
        if self.rows.contains_key(&foo.id) {
            return Err(DomainError::conflict(format!(
                "foo with id {} already exists",
                foo.id
            )));
        }
        self.pending.push(PendingWrite::Insert(foo.clone()));
        Ok(())
    }

    async fn update(&mut self, foo: &Foo, expected_version: i64) -> DomainResult<()> {
        self.pending.push(PendingWrite::Update {
            foo: foo.clone(),
            expected_version,
        });
        Ok(())
    }

    async fn delete(&mut self, id: &str) -> DomainResult<()> {
        self.pending.push(PendingWrite::Delete(id.to_string()));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> DomainResult<()> {
        let Self { rows, pending } = *self;
        for write in pending {
            match write {
                PendingWrite::Insert(foo) => match rows.entry(foo.id.clone()) {
                    Entry::Occupied(_) => {
                        return Err(DomainError::conflict(format!(
                            "foo with id {} already exists",
                            foo.id
                        )));
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(foo);
                    }
                },
                PendingWrite::Update {
                    foo,
                    expected_version,
                } => {
                    let Some(mut current) = rows.get_mut(&foo.id) else {
                        return Err(DomainError::not_found(FOO_ENTITY, foo.id));
                    };
                    if current.version != expected_version {
                        return Err(DomainError::conflict(format!(
                            "foo {} was modified concurrently",
                            foo.id
                        )));
                    }
                    *current = foo;
                }
                PendingWrite::Delete(id) => {
                    if rows.remove(&id).is_none() {
                        return Err(DomainError::not_found(FOO_ENTITY, id));
                    }
                }
            }
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::domain::ErrorKind;

    fn foo(id: &str, org: &str, name: &str, minute: u32) -> Foo {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, minute, 0).unwrap();
        Foo {
            id: id.into(),
            org_id: org.into(),
            namespace: "default".into(),
            name: name.into(),
            version: 1,
            created_at: at,
            updated_at: at,
        }
    }

    async fn seed(repo: &InMemoryFooRepository, foos: &[Foo]) {
        let mut uow = repo.begin().await.unwrap();
        for f in foos {
            uow.insert(f).await.unwrap();
        }
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn uncommitted_writes_are_discarded() {
        let repo = InMemoryFooRepository::new();
        let mut uow = repo.begin().await.unwrap();
        uow.insert(&foo("a", "org-1", "alpha", 0)).await.unwrap();
        assert!(uow.find_by_id("a").await.unwrap().is_some());
        drop(uow);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn stale_version_is_conflict() {
        let repo = InMemoryFooRepository::new();
        let original = foo("a", "org-1", "alpha", 0);
        seed(&repo, &[original.clone()]).await;

        let mut first = original.clone();
        first.rename("first".into(), original.created_at + Duration::seconds(1));
        let mut uow = repo.begin().await.unwrap();
        uow.update(&first, 1).await.unwrap();
        uow.commit().await.unwrap();

        let mut second = original.clone();
        second.rename("second".into(), original.created_at + Duration::seconds(2));
        let mut uow = repo.begin().await.unwrap();
        uow.update(&second, 1).await.unwrap();
        let err = uow.commit().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        assert_eq!(repo.find_by_id("a").await.unwrap().unwrap().name, "first");
    }

    #[tokio::test]
    async fn duplicate_insert_is_conflict() {
        let repo = InMemoryFooRepository::new();
        seed(&repo, &[foo("a", "org-1", "alpha", 0)]).await;
        let mut uow = repo.begin().await.unwrap();
        let err = uow.insert(&foo("a", "org-1", "again", 1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn list_orders_newest_first_and_paginates() {
        let repo = InMemoryFooRepository::new();
        seed(
            &repo,
            &[
                foo("a", "org-1", "alpha", 0),
                foo("b", "org-1", "beta", 1),
                foo("c", "org-1", "gamma", 2),
                foo("z", "org-2", "zeta", 3),
            ],
        )
        .await;

        let filter = FooFilter {
            org_id: "org-1".into(),
            namespace: "default".into(),
            search: None,
            limit: 2,
            offset: 1,
        };
        let page = repo.list(&filter).await.unwrap();
        assert_eq!(page.total, 3);
        let ids: Vec<_> = page.items.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }
}
