//! Health and build information endpoints

pub mod handlers;

pub use handlers::*;
