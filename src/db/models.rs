use crate::providers::ProviderKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum IntegrationStatus {
    Connected,
    Disconnected,
    Error,
}

/// One connection between an application user and an ad platform account.
///
/// Token columns are skipped when serializing; rows may be logged or returned, tokens may not.
#[derive(Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbIntegration {
    pub id: i64,
    pub user_id: String,
    pub provider: ProviderKind,
    pub status: IntegrationStatus,
    #[serde(skip_serializing, default)]
    pub access_token: Option<String>,
    #[serde(skip_serializing, default)]
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    /// External account id, `"unknown"` when it could not be resolved.
    pub account_id: String,
    pub account_name: String,
    pub account_currency: Option<String>,
    pub sync_enabled: bool,
    pub error_message: Option<String>,
    pub error_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for DbIntegration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbIntegration")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("provider", &self.provider)
            .field("status", &self.status)
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("token_expires_at", &self.token_expires_at)
            .field("account_id", &self.account_id)
            .field("account_name", &self.account_name)
            .field("account_currency", &self.account_currency)
            .field("sync_enabled", &self.sync_enabled)
            .field("error_message", &self.error_message)
            .field("error_count", &self.error_count)
            .finish_non_exhaustive()
    }
}

/// Row written by the metrics sync job; removed together with its integration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbSyncLog {
    pub id: i64,
    pub integration_id: i64,
    pub status: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Ledger entry behind a deletion receipt's status URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbDeletionRequest {
    pub confirmation_code: String,
    pub provider: ProviderKind,
    pub external_account_id: String,
    pub deleted_count: i64,
    pub failed_count: i64,
    pub created_at: DateTime<Utc>,
}
