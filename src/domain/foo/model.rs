//! Foo domain entity

use chrono::{DateTime, Utc};

/// Entity name used in error messages and log fields.
pub const FOO_ENTITY: &str = "foo";

/// A Foo resource scoped to an organization and namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Foo {
    pub id: String,
    pub org_id: String,
    pub namespace: String,
    pub name: String,
    /// Optimistic concurrency token. Starts at 1, bumped on every update.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Foo {
    /// Apply a rename at `now`, keeping `updated_at >= created_at` even if
    /// the clock went backwards.
    pub fn rename(&mut self, name: String, now: DateTime<Utc>) {
        self.name = name;
        self.updated_at = now.max(self.created_at);
        self.version += 1;
    }
}

/// Input for [`FooService::create`](crate::application::FooService::create).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFooInput {
    pub org_id: String,
    pub namespace: String,
    pub name: String,
}

/// Input for [`FooService::update`](crate::application::FooService::update).
///
/// Only `name` is mutable; `id` selects the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFooInput {
    pub id: String,
    pub name: String,
}

/// Listing parameters accepted by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooListParams {
    pub org_id: String,
    pub namespace: String,
    pub limit: u64,
    pub offset: u64,
    pub search: Option<String>,
}

/// Normalized filter handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooFilter {
    pub org_id: String,
    pub namespace: String,
    /// Case-insensitive substring of `name`; `None` matches everything.
    pub search: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

impl FooFilter {
    /// Whether `foo` falls inside this filter, ignoring pagination.
    pub fn matches(&self, foo: &Foo) -> bool {
        foo.org_id == self.org_id
            && foo.namespace == self.namespace
            && self
                .search
                .as_deref()
                .map_or(true, |term| {
                    foo.name.to_lowercase().contains(&term.to_lowercase())
                })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Foo {
        let now = Utc::now();
        Foo {
            id: "f-1".into(),
            org_id: "org-1".into(),
            namespace: "default".into(),
            name: "widget".into(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn rename_bumps_version_and_timestamp() {
        let mut foo = sample();
        let later = foo.created_at + Duration::seconds(5);
        foo.rename("gadget".into(), later);
        assert_eq!(foo.name, "gadget");
        assert_eq!(foo.updated_at, later);
        assert_eq!(foo.version, 2);
    }

    #[test]
    fn rename_never_moves_updated_at_before_created_at() {
        let mut foo = sample();
        let earlier = foo.created_at - Duration::hours(1);
        foo.rename("gadget".into(), earlier);
        assert_eq!(foo.updated_at, foo.created_at);
    }

    #[test]
    fn filter_matches_scope_and_search() {
        let foo = sample();
        let mut filter = FooFilter {
            org_id: "org-1".into(),
            namespace: "default".into(),
            search: None,
            limit: 50,
            offset: 0,
        };
        assert!(filter.matches(&foo));

        filter.search = Some("IDG".into());
        assert!(filter.matches(&foo));

        filter.search = Some("nope".into());
        assert!(!filter.matches(&foo));

        filter.search = None;
        filter.namespace = "other".into();
        assert!(!filter.matches(&foo));
    }
}
