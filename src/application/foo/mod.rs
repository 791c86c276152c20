//! Foo use-cases

pub mod service;

pub use service::FooService;
