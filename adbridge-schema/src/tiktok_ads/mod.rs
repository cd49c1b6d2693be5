use crate::oauth::deserialize_lax_u64;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Business API token request. Sent as a JSON body, not form-encoded.
#[derive(Debug, Clone, Serialize)]
pub struct TiktokTokenRequest<'a> {
    pub app_id: &'a str,
    pub secret: &'a str,
    pub auth_code: &'a str,
}

/// Every Business API response is wrapped in this status envelope.
///
/// HTTP status is 200 for most failures; `code == 0` is the only success signal.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TiktokEnvelope<T> {
    #[serde(default = "default_unknown_code")]
    pub code: i64,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> TiktokEnvelope<T> {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

fn default_unknown_code() -> i64 {
    -1
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TiktokTokenData {
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default, deserialize_with = "deserialize_lax_u64")]
    pub expires_in: Option<u64>,

    #[serde(default)]
    pub advertiser_ids: Vec<Value>,

    #[serde(default)]
    pub scope: Vec<Value>,
}

/// `GET /oauth2/advertiser/get/` payload.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TiktokAdvertiserList {
    #[serde(default)]
    pub list: Vec<TiktokAdvertiser>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TiktokAdvertiser {
    #[serde(default)]
    pub advertiser_id: Option<Value>,
    #[serde(default)]
    pub advertiser_name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl TiktokAdvertiser {
    pub fn external_id(&self) -> Option<String> {
        match self.advertiser_id.as_ref()? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_without_code_is_not_ok() {
        let env: TiktokEnvelope<TiktokTokenData> =
            serde_json::from_value(json!({ "message": "?" })).unwrap();
        assert!(!env.is_ok());
        assert!(env.data.is_none());
    }

    #[test]
    fn token_data_nests_under_data() {
        let env: TiktokEnvelope<TiktokTokenData> = serde_json::from_value(json!({
            "code": 0,
            "message": "OK",
            "request_id": "2024",
            "data": {
                "access_token": "tt-access",
                "advertiser_ids": ["7000000000000"],
                "scope": [4, 5]
            }
        }))
        .unwrap();
        assert!(env.is_ok());
        let data = env.data.expect("data");
        assert_eq!(data.access_token.as_deref(), Some("tt-access"));
        assert_eq!(data.expires_in, None);
    }
}
