//! Foo entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Foo row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "foos")]
pub struct Model {
    /// UUID assigned by the service
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning organization
    pub org_id: String,

    pub namespace: String,

    pub name: String,

    /// `name` lowercased in Rust; `search` matches against it
    pub search_name: String,

    /// Optimistic concurrency token
    pub version: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
