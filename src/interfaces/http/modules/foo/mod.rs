//! Foo module: CRUD endpoints for the Foo resource

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
