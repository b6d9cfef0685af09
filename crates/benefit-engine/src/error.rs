use crate::config::ConfigError;
use crate::eligibility::{
    ConfigStoreError, ContentError, EligibilityError, FactValidationError, RepositoryError,
    ScreeningServiceError,
};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Eligibility(EligibilityError),
    Repository(RepositoryError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Eligibility(err) => write!(f, "eligibility error: {}", err),
            AppError::Repository(err) => write!(f, "repository error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Eligibility(err) => Some(err),
            AppError::Repository(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Eligibility(err) => err.status_code(),
            AppError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            AppError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<EligibilityError> for AppError {
    fn from(value: EligibilityError) -> Self {
        Self::Eligibility(value)
    }
}

impl From<ConfigStoreError> for AppError {
    fn from(value: ConfigStoreError) -> Self {
        Self::Eligibility(value.into())
    }
}

impl From<ContentError> for AppError {
    fn from(value: ContentError) -> Self {
        Self::Eligibility(value.into())
    }
}

impl From<ScreeningServiceError> for AppError {
    fn from(value: ScreeningServiceError) -> Self {
        match value {
            ScreeningServiceError::Eligibility(err) => Self::Eligibility(err),
            ScreeningServiceError::Repository(err) => Self::Repository(err),
        }
    }
}

impl From<FactValidationError> for AppError {
    fn from(value: FactValidationError) -> Self {
        Self::Eligibility(value.into())
    }
}
