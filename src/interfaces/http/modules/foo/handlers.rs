//! Foo handlers
//!
//! Thin adapters: extract, convert, call [`FooService`], shape the response.
//! Every failure leaves as a [`Problem`].

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::dto::{CreateFooRequest, FooListResponse, FooResponse, ListFooParams, UpdateFooRequest};
use crate::application::FooService;
use crate::domain::FooListParams;
use crate::interfaces::http::common::{Problem, ValidatedJson};
use crate::shared::{ListQuery, ListQueryConfig};

/// Filter keys the list endpoint accepts; both are mandatory.
pub const FOO_FILTERS: [&str; 2] = ["org_id", "namespace"];

/// List contract for Foo: scoping filters required, limits from config.
pub fn foo_list_config(default_limit: u64, max_limit: u64) -> ListQueryConfig {
    ListQueryConfig::new(default_limit, max_limit).require(&FOO_FILTERS)
}

/// Foo handler state
#[derive(Clone)]
pub struct FooHandlerState {
    pub service: Arc<FooService>,
    pub list_config: Arc<ListQueryConfig>,
}

impl FooHandlerState {
    pub fn new(service: Arc<FooService>, list_config: ListQueryConfig) -> Self {
        Self {
            service,
            list_config: Arc::new(list_config),
        }
    }
}

/// Routes relative to the configured base path.
pub fn foo_routes(state: FooHandlerState) -> Router {
    Router::new()
        .route("/", get(list_foos).post(create_foo))
        .route("/{id}", get(get_foo).put(update_foo).delete(delete_foo))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/foo",
    tag = "Foo",
    request_body = CreateFooRequest,
    responses(
        (status = 201, description = "Foo created", body = FooResponse),
        (status = 400, description = "Invalid payload", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Conflict", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn create_foo(
    State(state): State<FooHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateFooRequest>,
) -> Result<(StatusCode, Json<FooResponse>), Problem> {
    let foo = state.service.create(request.into_input()).await?;
    Ok((StatusCode::CREATED, Json(foo.into())))
}

#[utoipa::path(
    get,
    path = "/foo/{id}",
    tag = "Foo",
    params(("id" = String, Path, description = "Foo ID")),
    responses(
        (status = 200, description = "Foo details", body = FooResponse),
        (status = 404, description = "Not found", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn get_foo(
    State(state): State<FooHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<FooResponse>, Problem> {
    let foo = state.service.get(&id).await?;
    Ok(Json(foo.into()))
}

#[utoipa::path(
    put,
    path = "/foo/{id}",
    tag = "Foo",
    params(("id" = String, Path, description = "Foo ID")),
    request_body = UpdateFooRequest,
    responses(
        (status = 200, description = "Foo renamed", body = FooResponse),
        (status = 400, description = "Invalid payload", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Concurrent modification", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn update_foo(
    State(state): State<FooHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateFooRequest>,
) -> Result<Json<FooResponse>, Problem> {
    let foo = state.service.update(request.into_input(&id)).await?;
    Ok(Json(foo.into()))
}

#[utoipa::path(
    delete,
    path = "/foo/{id}",
    tag = "Foo",
    params(("id" = String, Path, description = "Foo ID")),
    responses(
        (status = 204, description = "Foo deleted"),
        (status = 404, description = "Not found", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn delete_foo(
    State(state): State<FooHandlerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, Problem> {
    state.service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/foo",
    tag = "Foo",
    params(ListFooParams),
    responses(
        (status = 200, description = "Foo page", body = FooListResponse),
        (status = 400, description = "Missing scoping filters", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn list_foos(
    State(state): State<FooHandlerState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<FooListResponse>, Problem> {
    let query = ListQuery::parse(pairs, &state.list_config);

    let missing = query.missing_required();
    if !missing.is_empty() {
        return Err(Problem::bad_request(format!(
            "missing required filters: {}",
            missing.join(", ")
        )));
    }

    let params = FooListParams {
        org_id: query.first("org_id").unwrap_or_default().to_string(),
        namespace: query.first("namespace").unwrap_or_default().to_string(),
        limit: query.limit,
        offset: query.offset,
        search: query.search_term().map(str::to_string),
    };
    let result = state.service.list(params).await?;

    Ok(Json(FooListResponse::new(result, &query)))
}

// ── Tests ──────────────────────────────────────────────────────
