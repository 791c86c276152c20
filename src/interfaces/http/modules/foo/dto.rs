//! Foo DTOs
//!
//! Wire shapes for the Foo endpoints plus the conversions between them and
//! the domain types. Requests go wire -> domain through `into_input`,
//! responses go domain -> wire through `From`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{CreateFooInput, Foo, UpdateFooInput};
use crate::interfaces::http::common::BusinessRules;
use crate::shared::{ListQuery, ListResult};

/// Trim-and-check for one required field.
fn non_blank(value: &str, msg: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(msg.to_string());
    }
    Ok(())
}

// ── Requests ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateFooRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "org_id is required"))]
    #[schema(example = "org-1")]
    pub org_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "namespace is required"))]
    #[schema(example = "default")]
    pub namespace: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "widget")]
    pub name: String,
}

impl BusinessRules for CreateFooRequest {
    fn check_rules(&self) -> Result<(), String> {
        non_blank(&self.org_id, "org_id cannot be empty")?;
        non_blank(&self.namespace, "namespace cannot be empty")?;
        non_blank(&self.name, "name cannot be empty")
    }
}

impl CreateFooRequest {
    pub fn into_input(self) -> CreateFooInput {
        CreateFooInput {
            org_id: self.org_id.trim().to_string(),
            namespace: self.namespace.trim().to_string(),
            name: self.name.trim().to_string(),
        }
    }
}

/// Rename payload. `name` is the only mutable field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateFooRequest {
    #[validate(required(message = "name is required"))]
    #[schema(example = "widget-2")]
    pub name: Option<String>,
}

impl BusinessRules for UpdateFooRequest {
    fn check_rules(&self) -> Result<(), String> {
        match &self.name {
            Some(name) => non_blank(name, "name cannot be empty"),
            None => Err("name is required".to_string()),
        }
    }
}

impl UpdateFooRequest {
    pub fn into_input(self, id: &str) -> UpdateFooInput {
        UpdateFooInput {
            id: id.trim().to_string(),
            name: self.name.unwrap_or_default().trim().to_string(),
        }
    }
}

/// Query parameters of `GET /foo`, for documentation.
///
/// The handler reads raw pairs so repeated keys survive; see [`ListQuery`].
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListFooParams {
    /// Owning organization (required)
    pub org_id: String,
    /// Namespace inside the organization (required)
    pub namespace: String,
    /// Page size, defaults to 50, capped at 200
    pub limit: Option<i64>,
    /// Rows to skip
    pub offset: Option<i64>,
    /// Case-insensitive substring of `name`
    pub search: Option<String>,
}

// ── Responses ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FooResponse {
    pub id: String,
    pub org_id: String,
    pub namespace: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Foo> for FooResponse {
    fn from(f: Foo) -> Self {
        Self {
            id: f.id,
            org_id: f.org_id,
            namespace: f.namespace,
            name: f.name,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListMeta {
    /// Matches before pagination
    pub total: u64,
    /// Items in this page
    pub count: usize,
    pub limit: u64,
    pub offset: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<BTreeMap<String, Vec<String>>>,
}

/// Paginated list envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FooListResponse {
    pub data: Vec<FooResponse>,
    pub meta: ListMeta,
}

impl FooListResponse {
    pub fn new(result: ListResult<Foo>, query: &ListQuery) -> Self {
        let data: Vec<FooResponse> = result.items.into_iter().map(FooResponse::from).collect();
        let filters = query.filters();
        let meta = ListMeta {
            total: result.total,
            count: data.len(),
            limit: query.limit,
            offset: query.offset,
            search: (!query.search.is_empty()).then(|| query.search.clone()),
            filters: (!filters.is_empty()).then(|| filters.clone()),
        };
        Self { data, meta }
    }
}
