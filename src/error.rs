//! Unified error handling for the article endpoints.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::store::StoreError;
use crate::validation::FieldError;

/// RejectedForm
///
/// Body of a validation failure: the submitted form echoed back with the
/// errors it produced, so the client can re-render it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RejectedForm {
    #[schema(value_type = Object)]
    pub form: serde_json::Value,
    pub errors: Vec<FieldError>,
}

impl RejectedForm {
    pub fn new<T: Serialize>(form: &T, errors: Vec<FieldError>) -> Self {
        Self {
            form: serde_json::to_value(form).unwrap_or(serde_json::Value::Null),
            errors,
        }
    }
}

/// Application-level error type returned by the service and handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required identifier was not supplied.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The identifier does not resolve to a record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authenticated, but not the author and not an admin.
    #[error("Forbidden")]
    Forbidden,

    /// The submitted form violates field constraints.
    #[error("Validation failed: {} error(s)", .0.errors.len())]
    Validation(RejectedForm),

    /// The backend failed; never retried.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn article_not_found(id: i32) -> Self {
        Self::NotFound(format!("Cannot find article with ID {id}"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(rejected) => (status, Json(rejected)).into_response(),
            Self::Store(e) => {
                tracing::error!(error = %e, "article store failure");
                // Backend details stay in the logs.
                (status, "Internal server error").into_response()
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}
