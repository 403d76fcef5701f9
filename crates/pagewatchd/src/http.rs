//! Metrics endpoint.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Prometheus exposition |
//! | GET | `/healthz` | Liveness |

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;

use pagewatch_metrics::{MetricsCollector, render_prometheus};

pub fn build_router(metrics: Arc<MetricsCollector>) -> Router {
    Router::new()
        .route("/metrics", get(prometheus_metrics))
        .route("/healthz", get(healthz))
        .with_state(metrics)
}

async fn prometheus_metrics(State(metrics): State<Arc<MetricsCollector>>) -> impl IntoResponse {
    let body = render_prometheus(&metrics.snapshot());
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use pagewatch_core::{CheckResult, Outcome, ResultSink};

    #[tokio::test]
    async fn metrics_endpoint_renders_counters() {
        let metrics = Arc::new(MetricsCollector::new());
        metrics.record(&[CheckResult {
            url: "https://example.test/ok".to_string(),
            content_requirement: "hello".to_string(),
            elapsed_ms: 12.0,
            outcome: Outcome::Success,
            status_code: Some(200),
            checked_at: 0,
        }]);

        let req = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let resp = build_router(metrics).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.contains("text/plain"));

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains(
            "pagewatch_checks_total{url=\"https://example.test/ok\",outcome=\"success\"} 1"
        ));
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let req = Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();
        let resp = build_router(Arc::new(MetricsCollector::new()))
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
