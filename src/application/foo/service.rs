//! Foo service: application-layer orchestration
//!
//! All Foo business rules live here. HTTP handlers are thin wrappers that
//! validate and convert payloads, then delegate to this service.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::ports::{Clock, IdGenerator};
use crate::domain::foo::model::FOO_ENTITY;
use crate::domain::{
    CreateFooInput, DomainError, DomainResult, Foo, FooFilter, FooListParams, FooRepository,
    UpdateFooInput,
};
use crate::shared::ListResult;

/// Trim `value` and reject it when nothing is left.
fn required(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn record_mutation(op: &'static str) {
    metrics::counter!("foo_mutations_total", "op" => op).increment(1);
}

/// Foo service: owns id/timestamp assignment and every mutation rule.
pub struct FooService {
    repo: Arc<dyn FooRepository>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl FooService {
    pub fn new(
        repo: Arc<dyn FooRepository>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self { repo, clock, ids }
    }

    /// Liveness of the backing store.
    pub async fn ping(&self) -> DomainResult<()> {
        self.repo.ping().await
    }

    // ── Commands ────────────────────────────────────────────────

    /// Create a Foo. Blank org_id, namespace or name is rejected before any
    /// persistence call.
    pub async fn create(&self, input: CreateFooInput) -> DomainResult<Foo> {
        let org_id = required(&input.org_id, "org_id")?;
        let namespace = required(&input.namespace, "namespace")?;
        let name = required(&input.name, "name")?;

        let now = self.clock.now();
        let foo = Foo {
            id: self.ids.next_id(),
            org_id,
            namespace,
            name,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let mut uow = self.repo.begin().await?;
        uow.insert(&foo).await?;
        uow.commit().await?;

        record_mutation("create");
        info!(foo_id = %foo.id, org_id = %foo.org_id, namespace = %foo.namespace, "Foo created");
        Ok(foo)
    }

    /// Rename an existing Foo. Only `name` and `updated_at` change.
    pub async fn update(&self, input: UpdateFooInput) -> DomainResult<Foo> {
        let id = required(&input.id, "id")?;
        let name = required(&input.name, "name")?;

        let mut uow = self.repo.begin().await?;
        let Some(mut foo) = uow.find_by_id(&id).await? else {
            return Err(DomainError::not_found(FOO_ENTITY, id));
        };

        let expected_version = foo.version;
        foo.rename(name, self.clock.now());
        uow.update(&foo, expected_version).await?;
        uow.commit().await?;

        record_mutation("update");
        info!(foo_id = %foo.id, version = foo.version, "Foo updated");
        Ok(foo)
    }

    /// Hard-delete a Foo.
    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        let id = required(id, "id")?;

        let mut uow = self.repo.begin().await?;
        if uow.find_by_id(&id).await?.is_none() {
            return Err(DomainError::not_found(FOO_ENTITY, id));
        }
        uow.delete(&id).await?;
        uow.commit().await?;

        record_mutation("delete");
        info!(foo_id = %id, "Foo deleted");
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get(&self, id: &str) -> DomainResult<Foo> {
        let id = required(id, "id")?;
        self.repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| DomainError::not_found(FOO_ENTITY, id))
    }

    /// List Foos inside one organization and namespace.
    pub async fn list(&self, params: FooListParams) -> DomainResult<ListResult<Foo>> {
        let filter = FooFilter {
            org_id: required(&params.org_id, "org_id")?,
            namespace: required(&params.namespace, "namespace")?,
            search: params
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            limit: params.limit,
            offset: params.offset,
        };

        let result = self.repo.list(&filter).await?;
        debug!(
            org_id = %filter.org_id,
            namespace = %filter.namespace,
            total = result.total,
            returned = result.items.len(),
            "Foo list served"
        );
        Ok(result)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::domain::{ErrorKind, FooUnitOfWork};
    use crate::infrastructure::storage::InMemoryFooRepository;

    /// Clock that advances one second per call and counts calls.
    struct StepClock {
        next: Mutex<DateTime<Utc>>,
        calls: AtomicUsize,
    }

    impl StepClock {
        fn new() -> Self {
            Self {
                next: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut next = self.next.lock().unwrap();
            let now = *next;
            *next = now + Duration::seconds(1);
            now
        }
    }

    struct SeqIds(AtomicUsize);

    impl IdGenerator for SeqIds {
        fn next_id(&self) -> String {
            format!("foo-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    /// Wraps the in-memory repository and counts units of work.
    struct CountingRepo {
        inner: InMemoryFooRepository,
        begins: AtomicUsize,
    }

    #[async_trait]
    impl FooRepository for CountingRepo {
        async fn begin(&self) -> DomainResult<Box<dyn FooUnitOfWork>> {
            self.begins.fetch_add(1, Ordering::SeqCst);
            self.inner.begin().await
        }

        async fn find_by_id(&self, id: &str) -> DomainResult<Option<Foo>> {
            self.inner.find_by_id(id).await
        }

        async fn list(&self, filter: &FooFilter) -> DomainResult<ListResult<Foo>> {
            self.inner.list(filter).await
        }

        async fn ping(&self) -> DomainResult<()> {
            Ok(())
        }
    }

    struct Harness {
        service: FooService,
        repo: Arc<CountingRepo>,
        clock: Arc<StepClock>,
        ids: Arc<SeqIds>,
    }

    fn harness() -> Harness {
        let repo = Arc::new(CountingRepo {
            inner: InMemoryFooRepository::new(),
            begins: AtomicUsize::new(0),
        });
        let clock = Arc::new(StepClock::new());
        let ids = Arc::new(SeqIds(AtomicUsize::new(0)));
        Harness {
            service: FooService::new(repo.clone(), clock.clone(), ids.clone()),
            repo,
            clock,
            ids,
        }
    }

    fn input(org_id: &str, namespace: &str, name: &str) -> CreateFooInput {
        CreateFooInput {
            org_id: org_id.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_equal_timestamps() {
        let h = harness();
        let foo = h
            .service
            .create(input(" org-1 ", "default ", "  widget"))
            .await
            .unwrap();

        assert_eq!(foo.id, "foo-1");
        assert_eq!(foo.org_id, "org-1");
        assert_eq!(foo.namespace, "default");
        assert_eq!(foo.name, "widget");
        assert_eq!(foo.created_at, foo.updated_at);
        assert_eq!(h.clock.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.ids.0.load(Ordering::SeqCst), 1);
        assert_eq!(h.repo.begins.load(Ordering::SeqCst), 1);

        let stored = h.service.get("foo-1").await.unwrap();
        assert_eq!(stored, foo);
    }

    #[tokio::test]
    async fn create_rejects_blank_fields_without_persisting() {
        let h = harness();
        for (org, ns, name, field) in [
            ("", "default", "widget", "org_id"),
            ("org-1", "   ", "widget", "namespace"),
            ("org-1", "default", "\t", "name"),
        ] {
            let err = h.service.create(input(org, ns, name)).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Invalid);
            assert_eq!(err.to_string(), format!("{} is required", field));
        }
        assert_eq!(h.repo.begins.load(Ordering::SeqCst), 0);
        assert_eq!(h.clock.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.ids.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let h = harness();
        let err = h.service.get("nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn update_changes_only_name_and_updated_at() {
        let h = harness();
        let created = h
            .service
            .create(input("org-1", "default", "widget"))
            .await
            .unwrap();

        let updated = h
            .service
            .update(UpdateFooInput {
                id: created.id.clone(),
                name: " widget-2 ".into(),
            })
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.org_id, created.org_id);
        assert_eq!(updated.namespace, created.namespace);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "widget-2");
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.version, created.version + 1);
        // one clock call for create, one for update
        assert_eq!(h.clock.calls.load(Ordering::SeqCst), 2);

        assert_eq!(h.service.get(&created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_missing_is_not_found_and_mutates_nothing() {
        let h = harness();
        let existing = h
            .service
            .create(input("org-1", "default", "widget"))
            .await
            .unwrap();

        let err = h
            .service
            .update(UpdateFooInput {
                id: "missing".into(),
                name: "x".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(h.service.get(&existing.id).await.unwrap(), existing);
        assert_eq!(h.clock.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn update_rejects_blank_name() {
        let h = harness();
        let foo = h
            .service
            .create(input("org-1", "default", "widget"))
            .await
            .unwrap();
        let err = h
            .service
            .update(UpdateFooInput {
                id: foo.id,
                name: "   ".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert_eq!(h.repo.begins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let h = harness();
        let foo = h
            .service
            .create(input("org-1", "default", "widget"))
            .await
            .unwrap();

        h.service.delete(&foo.id).await.unwrap();
        let err = h.service.get(&foo.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = h.service.delete(&foo.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn list_is_scoped_to_org_and_namespace() {
        let h = harness();
        for (org, ns, name) in [
            ("org-1", "default", "alpha"),
            ("org-1", "default", "beta"),
            ("org-1", "other", "gamma"),
            ("org-2", "default", "delta"),
        ] {
            h.service.create(input(org, ns, name)).await.unwrap();
        }

        let page = h
            .service
            .list(FooListParams {
                org_id: "org-1".into(),
                namespace: "default".into(),
                limit: 1,
                offset: 0,
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert!(page
            .items
            .iter()
            .all(|f| f.org_id == "org-1" && f.namespace == "default"));

        let searched = h
            .service
            .list(FooListParams {
                org_id: "org-1".into(),
                namespace: "default".into(),
                limit: 50,
                offset: 0,
                search: Some("bet".into()),
            })
            .await
            .unwrap();
        assert_eq!(searched.total, 1);
        assert_eq!(searched.items[0].name, "beta");
    }

    #[tokio::test]
    async fn list_requires_scope() {
        let h = harness();
        let err = h
            .service
            .list(FooListParams {
                org_id: " ".into(),
                namespace: "default".into(),
                limit: 10,
                offset: 0,
                search: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::invalid("org_id is required"));
    }

    /// Repository whose writes always lose an optimistic-lock race.
    struct RacingRepo(InMemoryFooRepository);

    struct RacingUnitOfWork(Box<dyn FooUnitOfWork>);

    #[async_trait]
    impl FooUnitOfWork for RacingUnitOfWork {
        async fn find_by_id(&mut self, id: &str) -> DomainResult<Option<Foo>> {
            self.0.find_by_id(id).await
        }

        async fn insert(&mut self, foo: &Foo) -> DomainResult<()> {
            self.0.insert(foo).await
        }

        async fn update(&mut self, _foo: &Foo, _expected_version: i64) -> DomainResult<()> {
            Err(DomainError::conflict("foo was modified concurrently"))
        }

        async fn delete(&mut self, id: &str) -> DomainResult<()> {
            self.0.delete(id).await
        }

        async fn commit(self: Box<Self>) -> DomainResult<()> {
            self.0.commit().await
        }
    }

    #[async_trait]
    impl FooRepository for RacingRepo {
        async fn begin(&self) -> DomainResult<Box<dyn FooUnitOfWork>> {
            Ok(Box::new(RacingUnitOfWork(self.0.begin().await?)))
        }

        async fn find_by_id(&self, id: &str) -> DomainResult<Option<Foo>> {
            self.0.find_by_id(id).await
        }

        async fn list(&self, filter: &FooFilter) -> DomainResult<ListResult<Foo>> {
            self.0.list(filter).await
        }

        async fn ping(&self) -> DomainResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn update_surfaces_conflict_and_keeps_old_state() {
        let repo = Arc::new(RacingRepo(InMemoryFooRepository::new()));
        let service = FooService::new(
            repo.clone(),
            Arc::new(StepClock::new()),
            Arc::new(SeqIds(AtomicUsize::new(0))),
        );
        let foo = service
            .create(input("org-1", "default", "widget"))
            .await
            .unwrap();

        let err = service
            .update(UpdateFooInput {
                id: foo.id.clone(),
                name: "other".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(service.get(&foo.id).await.unwrap().name, "widget");
    }
}
