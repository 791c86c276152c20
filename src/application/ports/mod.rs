//! Application ports (hexagonal architecture boundaries)
//!
//! Outbound capabilities the services depend on. Persistence contracts live
//! next to their aggregates in `domain`; the ones here are process-level.

pub mod outbound;

pub use outbound::{Clock, IdGenerator};
