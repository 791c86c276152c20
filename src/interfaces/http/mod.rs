//! HTTP REST API interfaces
//!
//! - `common`: problem responses and the validated JSON extractor
//! - `modules`: Foo, health, metrics and request-id endpoints/middleware
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::{api_doc, create_api_router, ApiDoc, RouterDeps};
