//! Database entities module

pub mod foo;

pub use foo::Entity as Foo;
