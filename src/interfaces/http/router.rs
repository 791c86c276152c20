//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::FooService;
use crate::config::BuildInfo;
use crate::interfaces::http::common::Problem;
use crate::interfaces::http::modules::foo::{self, FooHandlerState};
use crate::interfaces::http::modules::health::{self, HealthState};
use crate::interfaces::http::modules::metrics::{
    http_metrics_middleware, prometheus_metrics, MetricsState,
};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::shared::ListQueryConfig;

/// Prefix the Foo paths are documented under before being rebased.
const DOC_FOO_PREFIX: &str = "/foo";

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        health::version_info,
        // Foo
        foo::list_foos,
        foo::create_foo,
        foo::get_foo,
        foo::update_foo,
        foo::delete_foo,
    ),
    components(
        schemas(
            Problem,
            BuildInfo,
            health::HealthResponse,
            health::ComponentHealth,
            foo::CreateFooRequest,
            foo::UpdateFooRequest,
            foo::FooResponse,
            foo::FooListResponse,
            foo::ListMeta,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and build information"),
        (name = "Foo", description = "Foo resource CRUD"),
    ),
    info(
        title = "Foo Service API",
        description = "CRUD REST API for Foo resources scoped by organization and namespace",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// OpenAPI document with Foo paths moved under `base_path`.
pub fn api_doc(base_path: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let paths = std::mem::take(&mut doc.paths.paths);
    doc.paths.paths = paths
        .into_iter()
        .map(|(path, item)| match path.strip_prefix(DOC_FOO_PREFIX) {
            Some(rest) => (format!("{}{}", base_path, rest), item),
            None => (path, item),
        })
        .collect();
    doc
}

/// Everything the router needs from the composition root.
pub struct RouterDeps {
    pub foo_service: Arc<FooService>,
    pub list_config: ListQueryConfig,
    /// Mount point of the Foo routes, e.g. `/api/v1/foo`
    pub base_path: String,
    pub build: Arc<BuildInfo>,
    /// `/metrics` is only mounted when a recorder handle is supplied.
    pub prometheus: Option<PrometheusHandle>,
}

/// Create the API router with all routes
pub fn create_api_router(deps: RouterDeps) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let health_state = HealthState {
        service: Arc::clone(&deps.foo_service),
        build: Arc::clone(&deps.build),
        started_at: Arc::new(Instant::now()),
    };
    let system_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/version", get(health::version_info))
        .with_state(health_state);

    let foo_routes = foo::foo_routes(FooHandlerState::new(deps.foo_service, deps.list_config));

    let swagger_routes =
        SwaggerUi::new("/docs").url("/api-doc/openapi.json", api_doc(&deps.base_path));

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(system_routes)
        .nest(&deps.base_path, foo_routes);

    if let Some(handle) = deps.prometheus {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
