use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use benefit_engine::eligibility::{
    eligibility_router, ConfigStore, ContentCatalog, ScreeningRepository, ScreeningService,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_eligibility_routes<S, C, R>(
    service: Arc<ScreeningService<S, C, R>>,
) -> axum::Router
where
    S: ConfigStore + 'static,
    C: ContentCatalog + 'static,
    R: ScreeningRepository + 'static,
{
    eligibility_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::example_household;
    use crate::infra::{build_service, shipped_engine_config, InMemoryScreeningRepository};
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> (axum::Router, Arc<InMemoryScreeningRepository>) {
        let repository = Arc::new(InMemoryScreeningRepository::default());
        let service = build_service(&shipped_engine_config(), repository.clone())
            .expect("service builds from shipped config");
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let router = with_eligibility_routes(service).layer(Extension(state));
        (router, repository)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn readiness_reflects_startup_state() {
        let (router, _) = app(false);
        let response = router
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["status"], "initializing");

        let (router, _) = app(true);
        let response = router
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_and_metrics_respond() {
        let (router, _) = app(true);
        let response = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));

        let response = router
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn screenings_are_served_from_shipped_rules() {
        let (router, repository) = app(true);
        let body = serde_json::to_vec(&example_household()).expect("household json");

        let response = router
            .oneshot(
                Request::post("/api/v1/eligibility/screenings")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::CREATED);
        let payload = body_json(response).await;
        assert_eq!(payload["report"]["jurisdictionCode"], "KY");
        assert_eq!(repository.len(), 1);
    }
}
