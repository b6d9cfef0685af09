use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::content::ContentCatalog;
use super::domain::HouseholdSubmission;
use super::navigator::EligibilityError;
use super::repository::{RepositoryError, ScreeningRepository};
use super::service::{ScreeningService, ScreeningServiceError};
use super::store::{ConfigStore, ConfigStoreError};

/// Body of a screening request: household facts plus an optional jurisdiction display name used
/// when the generic rules stand in.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningRequest {
    #[serde(flatten)]
    pub household: HouseholdSubmission,
    #[serde(default)]
    pub state_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    pub state_code: String,
    pub eligible_program_ids: Vec<String>,
    #[serde(default)]
    pub has_private_insurance: bool,
}

/// Router builder exposing screening, evaluation, and interaction endpoints.
pub fn eligibility_router<S, C, R>(service: Arc<ScreeningService<S, C, R>>) -> Router
where
    S: ConfigStore + 'static,
    C: ContentCatalog + 'static,
    R: ScreeningRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/eligibility/screenings",
            post(screen_handler::<S, C, R>),
        )
        .route(
            "/api/v1/eligibility/screenings/:session_id",
            get(session_handler::<S, C, R>),
        )
        .route(
            "/api/v1/eligibility/evaluate",
            post(evaluate_handler::<S, C, R>),
        )
        .route(
            "/api/v1/eligibility/interactions",
            post(interactions_handler::<S, C, R>),
        )
        .with_state(service)
}

pub(crate) async fn screen_handler<S, C, R>(
    State(service): State<Arc<ScreeningService<S, C, R>>>,
    axum::Json(request): axum::Json<ScreeningRequest>,
) -> Response
where
    S: ConfigStore + 'static,
    C: ContentCatalog + 'static,
    R: ScreeningRepository + 'static,
{
    match service.screen(request.household, request.state_name.as_deref()) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn session_handler<S, C, R>(
    State(service): State<Arc<ScreeningService<S, C, R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: ConfigStore + 'static,
    C: ContentCatalog + 'static,
    R: ScreeningRepository + 'static,
{
    match service.get(&session_id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(ScreeningServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "screening session not found",
                "sessionId": session_id,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn evaluate_handler<S, C, R>(
    State(service): State<Arc<ScreeningService<S, C, R>>>,
    axum::Json(submission): axum::Json<HouseholdSubmission>,
) -> Response
where
    S: ConfigStore + 'static,
    C: ContentCatalog + 'static,
    R: ScreeningRepository + 'static,
{
    match service.evaluate(&submission) {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn interactions_handler<S, C, R>(
    State(service): State<Arc<ScreeningService<S, C, R>>>,
    axum::Json(request): axum::Json<InteractionRequest>,
) -> Response
where
    S: ConfigStore + 'static,
    C: ContentCatalog + 'static,
    R: ScreeningRepository + 'static,
{
    match service.interactions(
        &request.state_code,
        &request.eligible_program_ids,
        request.has_private_insurance,
    ) {
        Ok(interactions) => (StatusCode::OK, axum::Json(interactions)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ScreeningServiceError) -> Response {
    match error {
        ScreeningServiceError::Eligibility(error) => {
            let status = error.status_code();
            let payload = match &error {
                EligibilityError::Validation(validation) => json!({
                    "error": error.to_string(),
                    "fields": validation.fields(),
                }),
                EligibilityError::Config(ConfigStoreError::Invalid { violations, .. }) => json!({
                    "error": error.to_string(),
                    "violations": violations,
                }),
                _ => json!({ "error": error.to_string() }),
            };
            (status, axum::Json(payload)).into_response()
        }
        ScreeningServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "screening session already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        ScreeningServiceError::Repository(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
