//! Outbound ports: time and identity sources
//!
//! Services never call `Utc::now()` or `Uuid::new_v4()` directly; they go
//! through these traits so tests can pin both. Production implementations
//! live in [`crate::infrastructure::system`].

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of fresh, never-reused identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}
