use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error as ThisError;

/// Rejection reasons of the signed request verifier.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum VerifyError {
    /// Envelope is not `<signature>.<payload>` or a half is not base64url.
    #[error("malformed signed request: {0}")]
    Malformed(&'static str),

    #[error("signature mismatch")]
    SignatureMismatch,

    /// Signature matched but the payload is not a JSON object.
    #[error("signed payload is not valid JSON")]
    InvalidPayload,
}

/// Outcome of a rejected deletion webhook, as seen by the calling provider.
#[derive(Debug, ThisError)]
pub enum WebhookError {
    #[error("invalid signed request: {0}")]
    InvalidSignedRequest(String),

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("signed payload has no account identifier")]
    MissingIdentifier,

    #[error("deletion webhook is not configured: {0}")]
    Config(&'static str),
}

impl WebhookError {
    pub fn category(&self) -> &'static str {
        match self {
            WebhookError::InvalidSignedRequest(_) => "invalid_signed_request",
            WebhookError::SignatureMismatch => "signature_mismatch",
            WebhookError::MissingIdentifier => "missing_identifier",
            WebhookError::Config(_) => "config_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignedRequest(_) | WebhookError::MissingIdentifier => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::SignatureMismatch => StatusCode::FORBIDDEN,
            WebhookError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VerifyError> for WebhookError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::SignatureMismatch => WebhookError::SignatureMismatch,
            other => WebhookError::InvalidSignedRequest(other.to_string()),
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(json!({ "error": self.category() }))).into_response()
    }
}
