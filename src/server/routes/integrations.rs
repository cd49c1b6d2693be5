use crate::db::{DbIntegration, IntegrationStatus};
use crate::error::GatewayError;
use crate::providers::ProviderKind;
use crate::server::router::GatewayState;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Integration as shown to the application. Carries no token material.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationView {
    pub provider: ProviderKind,
    pub status: IntegrationStatus,
    pub account_id: String,
    pub account_name: String,
    pub account_currency: Option<String>,
    pub sync_enabled: bool,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub has_refresh_token: bool,
    pub error_message: Option<String>,
    pub error_count: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<DbIntegration> for IntegrationView {
    fn from(row: DbIntegration) -> Self {
        Self {
            provider: row.provider,
            status: row.status,
            account_id: row.account_id,
            account_name: row.account_name,
            account_currency: row.account_currency,
            sync_enabled: row.sync_enabled,
            token_expires_at: row.token_expires_at,
            has_refresh_token: row.refresh_token.is_some(),
            error_message: row.error_message,
            error_count: row.error_count,
            updated_at: row.updated_at,
        }
    }
}

pub fn router() -> Router<GatewayState> {
    Router::new()
        .route("/integrations/{user_id}", get(list_integrations))
        .route(
            "/integrations/{user_id}/{provider}/disconnect",
            post(disconnect_integration),
        )
}

/// GET /integrations/{user_id}
pub async fn list_integrations(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<IntegrationView>>, GatewayError> {
    let rows = state.db.list_integrations_for_user(&user_id).await?;
    Ok(Json(rows.into_iter().map(IntegrationView::from).collect()))
}

/// POST /integrations/{user_id}/{provider}/disconnect
pub async fn disconnect_integration(
    State(state): State<GatewayState>,
    Path((user_id, provider)): Path<(String, String)>,
) -> Result<Json<IntegrationView>, GatewayError> {
    let kind: ProviderKind = provider
        .parse()
        .map_err(|_| GatewayError::UnknownProvider(provider.clone()))?;

    if !state.db.disconnect(&user_id, kind).await? {
        return Err(GatewayError::NotFound(format!("{kind} integration of {user_id}")));
    }
    info!(provider = %kind, %user_id, "Integration disconnected");

    let row = state
        .db
        .get_integration(&user_id, kind)
        .await?
        .ok_or_else(|| GatewayError::NotFound(format!("{kind} integration of {user_id}")))?;
    Ok(Json(row.into()))
}
