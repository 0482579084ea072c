use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

pub const MISSING_PROVIDER_KEY: &str = "provider key not configured";

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every problem found in a search request, not just the first.
#[derive(Error, Clone, Debug, Default, PartialEq, Eq)]
#[error("invalid search request: {}", describe_fields(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

fn describe_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider responded with {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        match self {
            SearchError::Validation(e) => {
                warn!("Rejected search request: {}", e);
                (StatusCode::BAD_REQUEST, Json(json!({ "error": e.errors }))).into_response()
            }
            SearchError::Configuration(cause) => {
                error!("Search is misconfigured: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": MISSING_PROVIDER_KEY })),
                ).into_response()
            }
            SearchError::Upstream { status, body } => {
                warn!("Restaurant provider rejected search with {}: {}", status, body);
                (
                    status,
                    Json(json!({
                        "error": "Failed to fetch from restaurant provider",
                        "details": body,
                    })),
                ).into_response()
            }
            SearchError::Internal(e) => {
                error!("Search failed unexpectedly: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                ).into_response()
            }
        }
    }
}
