use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;

/// Errors of the JSON management routes and of the store.
#[derive(Debug, ThisError)]
pub enum GatewayError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            GatewayError::DatabaseError(sqlx::Error::RowNotFound) | GatewayError::NotFound(_) => {
                let status = StatusCode::NOT_FOUND;
                let body = ApiErrorObject {
                    code: "NOT_FOUND".to_string(),
                    message: "The requested resource does not exist.".to_string(),
                    details: None,
                };
                (status, body)
            }

            GatewayError::UnknownProvider(provider) => {
                let status = StatusCode::BAD_REQUEST;
                let body = ApiErrorObject {
                    code: "UNKNOWN_PROVIDER".to_string(),
                    message: format!("Unknown provider: {provider}"),
                    details: None,
                };
                (status, body)
            }

            GatewayError::DatabaseError(_) | GatewayError::RactorError(_) => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorObject {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                    details: None,
                };
                (status, body)
            }
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
