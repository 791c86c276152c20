pub mod foo;
pub mod ports;

// Re-export key types for convenience
pub use foo::FooService;
pub use ports::{Clock, IdGenerator};
