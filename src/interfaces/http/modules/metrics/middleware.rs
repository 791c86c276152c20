//! HTTP request metrics middleware
//!
//! - `http_requests_total{method,path,status}` counter
//! - `http_request_duration_seconds{method,path}` histogram
//! - `http_requests_in_flight` gauge

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

/// Path label for requests no route matched.
pub const UNMATCHED_PATH: &str = "unmatched";

struct RequestLabels {
    method: String,
    /// Route template, never the raw URI
    path: String,
}

impl RequestLabels {
    fn of(request: &Request<Body>) -> Self {
        Self {
            method: request.method().as_str().to_string(),
            path: request
                .extensions()
                .get::<MatchedPath>()
                .map_or_else(|| UNMATCHED_PATH.to_string(), |mp| mp.as_str().to_string()),
        }
    }

    fn record(self, status: StatusCode, elapsed: Duration) {
        metrics::counter!(
            "http_requests_total",
            "method" => self.method.clone(),
            "path" => self.path.clone(),
            "status" => status.as_str().to_string()
        )
        .increment(1);
        metrics::histogram!(
            "http_request_duration_seconds",
            "method" => self.method,
            "path" => self.path
        )
        .record(elapsed.as_secs_f64());
    }
}

pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let labels = RequestLabels::of(&request);
    let in_flight = metrics::gauge!("http_requests_in_flight");

    in_flight.increment(1.0);
    let start = Instant::now();
    let response = next.run(request).await;
    in_flight.decrement(1.0);

    labels.record(response.status(), start.elapsed());
    response
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum::{middleware, Router};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::Service;

    use super::*;

    #[tokio::test]
    async fn labels_use_route_template() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        // current-thread runtime: the whole request runs on this thread
        let _guard = metrics::set_default_local_recorder(&recorder);

        let app = Router::new()
            .route("/items/{id}", get(|| async { "ok" }))
            .layer(middleware::from_fn(http_metrics_middleware));
        let req = Request::builder().uri("/items/42").body(Body::empty()).unwrap();
        let resp = app.into_service().call(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let text = handle.render();
        let line = text
            .lines()
            .find(|l| l.starts_with("http_requests_total{"))
            .unwrap();
        assert!(line.contains(r#"path="/items/{id}""#));
        assert!(line.contains(r#"status="200""#));
        assert!(line.ends_with(" 1"));
        assert!(!text.contains("/items/42"));
    }
}
