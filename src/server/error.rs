use crate::dispatcher::HandlerResponse;
use crate::validator::ValidationError;
use serde_json::json;
use thiserror::Error;

/// Why a request was answered without reaching its handler.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("no route matches {method} {path}")]
    NotFound { method: String, path: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("request body of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("no handler registered for '{0}'")]
    HandlerNotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl RequestError {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            RequestError::NotFound { .. } | RequestError::HandlerNotFound(_) => 404,
            RequestError::Validation(_) => 422,
            RequestError::PayloadTooLarge { .. } => 413,
            RequestError::BadRequest(_) => 400,
        }
    }

    /// The JSON response sent for this error.
    #[must_use]
    pub fn into_response(self) -> HandlerResponse {
        let status = self.status();
        match self {
            RequestError::NotFound { .. } => HandlerResponse::detail(status, "Not Found"),
            RequestError::Validation(err) => HandlerResponse::json(status, err.to_body()),
            RequestError::PayloadTooLarge { limit, .. } => HandlerResponse::json(
                status,
                json!({ "detail": "Request body too large", "limit": limit }),
            ),
            RequestError::HandlerNotFound(_) => HandlerResponse::error(status, "Handler not found"),
            RequestError::BadRequest(reason) => HandlerResponse::detail(status, reason),
        }
    }
}
