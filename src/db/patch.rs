use crate::providers::ProviderKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields written by a successful (re)connect.
///
/// Applied as an upsert on `(user_id, provider)`: every column is overwritten, the status
/// goes back to `connected` and error bookkeeping is cleared.
#[derive(Clone, Serialize, Deserialize)]
pub struct IntegrationUpsert {
    pub user_id: String,
    pub provider: ProviderKind,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub account_id: String,
    pub account_name: String,
    pub account_currency: Option<String>,
}

impl std::fmt::Debug for IntegrationUpsert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationUpsert")
            .field("user_id", &self.user_id)
            .field("provider", &self.provider)
            .field("token_expires_at", &self.token_expires_at)
            .field("account_id", &self.account_id)
            .field("account_name", &self.account_name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncLogCreate {
    pub integration_id: i64,
    pub status: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionRequestCreate {
    pub confirmation_code: String,
    pub provider: ProviderKind,
    pub external_account_id: String,
    pub deleted_count: i64,
    pub failed_count: i64,
}
