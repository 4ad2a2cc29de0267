use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error as ThisError;
use tracing::error;

pub type Result<T, E = PersonalityError> = std::result::Result<T, E>;

#[derive(Debug, ThisError)]
pub enum PersonalityError {
    #[error("failed to load database source from {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("invalid certificate file {}: {reason}", path.display())]
    Cert { path: PathBuf, reason: String },

    #[error("database connection setup failed: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(#[source] SqlxError),

    #[error("invalid personality id {raw:?}: {source}")]
    Parse {
        raw: String,
        #[source]
        source: ParseIntError,
    },

    #[error("row mapping error: {0}")]
    Mapping(#[source] SqlxError),
}

impl IntoResponse for PersonalityError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match &self {
            PersonalityError::Parse { raw, .. } => {
                let status = StatusCode::BAD_REQUEST;
                let body = ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message: format!("id must be a base-10 64-bit integer, got {raw:?}"),
                };
                (status, body)
            }
            PersonalityError::Query(_) | PersonalityError::Mapping(_) => {
                error!(error = %self, "request failed");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (status, body)
            }
            // Bootstrap failures abort startup; they only land here if a caller
            // forwards one by hand.
            PersonalityError::Config { .. }
            | PersonalityError::Cert { .. }
            | PersonalityError::Connection(_) => {
                error!(error = %self, "bootstrap error reached a request");
                let status = StatusCode::SERVICE_UNAVAILABLE;
                let body = ApiErrorBody {
                    code: "UNAVAILABLE".to_string(),
                    message: "The database is not configured.".to_string(),
                };
                (status, body)
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
