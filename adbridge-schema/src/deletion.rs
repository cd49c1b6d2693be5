use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Decoded payload half of a `signed_request` envelope.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SignedRequestPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,

    /// App-scoped id of the account whose data must be removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl SignedRequestPayload {
    /// `user_id` as a string; numeric ids are accepted as well.
    pub fn user_id(&self) -> Option<String> {
        match self.user_id.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Body returned to the provider after a deletion request was processed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeletionReceiptBody {
    pub url: String,
    pub confirmation_code: String,
}

/// Body served at the receipt's status URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeletionStatusBody {
    pub confirmation_code: String,
    pub status: String,
    pub deleted_count: i64,
    pub processed_at: DateTime<Utc>,
}
