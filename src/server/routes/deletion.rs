use crate::deletion::{STATUS_PATH, delete_by_external_account};
use crate::error::{GatewayError, WebhookError};
use crate::providers::{ProviderKind, meta_ads};
use crate::server::router::GatewayState;
use crate::signed_request;
use adbridge_schema::{DeletionReceiptBody, DeletionStatusBody, SignedRequestPayload};
use axum::{
    Form, Json, Router,
    extract::{Query, State, rejection::FormRejection},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;

pub const META_DELETION_PATH: &str = "/webhooks/meta/data-deletion";

#[derive(Debug, Default, Deserialize)]
pub struct DeletionForm {
    pub signed_request: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub code: Option<String>,
}

pub fn router() -> Router<GatewayState> {
    Router::new()
        .route(META_DELETION_PATH, post(meta_data_deletion))
        .route(STATUS_PATH, get(deletion_status))
}

/// POST /webhooks/meta/data-deletion
///
/// Meta's data deletion callback: a form with one `signed_request` field. The identifier to
/// delete is the payload's `user_id`, matched against stored Meta account ids.
pub async fn meta_data_deletion(
    State(state): State<GatewayState>,
    form: Result<Form<DeletionForm>, FormRejection>,
) -> Result<Json<DeletionReceiptBody>, WebhookError> {
    // A body that is not a form at all counts as a missing `signed_request`.
    let Form(form) = form.map_err(|e| WebhookError::InvalidSignedRequest(e.body_text()))?;
    let signed = form
        .signed_request
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| WebhookError::InvalidSignedRequest("missing signed_request".to_string()))?;

    let secret = state
        .credentials
        .get(meta_ads::CLIENT_SECRET_KEY)
        .ok_or(WebhookError::Config(meta_ads::CLIENT_SECRET_KEY))?;

    let payload: SignedRequestPayload = signed_request::verify(signed.trim(), &secret)?;
    let account_id = payload.user_id().ok_or(WebhookError::MissingIdentifier)?;

    info!(provider = %ProviderKind::MetaAds, %account_id, "Verified data deletion request");
    let receipt = delete_by_external_account(
        &state.db,
        ProviderKind::MetaAds,
        &account_id,
        &state.public_url,
    )
    .await;

    Ok(Json(DeletionReceiptBody {
        url: receipt.status_url.to_string(),
        confirmation_code: receipt.confirmation_code,
    }))
}

/// GET /data-deletion/status?code=...
pub async fn deletion_status(
    State(state): State<GatewayState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<DeletionStatusBody>, GatewayError> {
    let code = query
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| GatewayError::NotFound("confirmation code".to_string()))?;

    let request = state
        .db
        .get_deletion_request(code.trim())
        .await?
        .ok_or_else(|| GatewayError::NotFound(format!("deletion request {code}")))?;

    Ok(Json(DeletionStatusBody {
        confirmation_code: request.confirmation_code,
        status: "completed".to_string(),
        deleted_count: request.deleted_count,
        processed_at: request.created_at,
    }))
}
