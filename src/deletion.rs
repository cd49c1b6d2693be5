//! Deletion cascade for provider-initiated "delete my data" callbacks.
//!
//! Each matching integration is removed on its own: sync logs first, then the row. A failure
//! on one record is logged and counted and the remaining records are still processed. The
//! caller always receives a receipt with a fresh confirmation code, also when nothing matched.

use crate::db::{DbActorHandle, DeletionRequestCreate};
use crate::providers::ProviderKind;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

/// Path of the receipt status page, relative to the public base URL.
pub const STATUS_PATH: &str = "/data-deletion/status";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReceipt {
    pub confirmation_code: String,
    pub status_url: Url,
    pub deleted_count: u64,
    pub failed_count: u64,
}

/// Status page URL for `confirmation_code` below `public_url`.
pub fn status_url(public_url: &Url, confirmation_code: &str) -> Url {
    let mut url = public_url.clone();
    let base_path = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{base_path}{STATUS_PATH}"));
    url.query_pairs_mut()
        .clear()
        .append_pair("code", confirmation_code);
    url
}

/// Deletes every integration of `provider` linked to `external_account_id`.
pub async fn delete_by_external_account(
    db: &DbActorHandle,
    provider: ProviderKind,
    external_account_id: &str,
    public_url: &Url,
) -> DeletionReceipt {
    let confirmation_code = Uuid::new_v4().simple().to_string();

    let records = db
        .list_by_external_account(provider, external_account_id)
        .await
        .unwrap_or_else(|e| {
            warn!(%provider, account_id = external_account_id, error = %e, "Deletion lookup failed; acknowledging without cleanup");
            Vec::new()
        });

    let mut deleted_count = 0u64;
    let mut failed_count = 0u64;
    for record in &records {
        let outcome = match db.delete_sync_logs(record.id).await {
            Ok(_) => db.delete_integration(record.id).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(n) if n > 0 => deleted_count += 1,
            Ok(_) => {}
            Err(e) => {
                failed_count += 1;
                warn!(%provider, integration_id = record.id, error = %e, "Failed to delete integration");
            }
        }
    }

    if let Err(e) = db
        .record_deletion_request(DeletionRequestCreate {
            confirmation_code: confirmation_code.clone(),
            provider,
            external_account_id: external_account_id.to_string(),
            deleted_count: i64::try_from(deleted_count).unwrap_or(i64::MAX),
            failed_count: i64::try_from(failed_count).unwrap_or(i64::MAX),
        })
        .await
    {
        warn!(%provider, %confirmation_code, error = %e, "Failed to record deletion request");
    }

    info!(
        %provider,
        account_id = external_account_id,
        matched = records.len(),
        deleted_count,
        failed_count,
        %confirmation_code,
        "Processed deletion request"
    );

    DeletionReceipt {
        status_url: status_url(public_url, &confirmation_code),
        confirmation_code,
        deleted_count,
        failed_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_url_keeps_base_path() {
        let base = Url::parse("https://app.example.com/gateway/").unwrap();
        assert_eq!(
            status_url(&base, "abc").as_str(),
            "https://app.example.com/gateway/data-deletion/status?code=abc"
        );

        let root = Url::parse("https://app.example.com").unwrap();
        assert_eq!(
            status_url(&root, "abc").as_str(),
            "https://app.example.com/data-deletion/status?code=abc"
        );
    }
}
