use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// RFC 6749 style token endpoint body, as returned by the form-encoded providers.
///
/// Every field is optional on purpose: the caller decides whether a missing
/// `access_token` is an error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StandardTokenBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Lifetime in seconds. Some providers send it as a numeric string.
    #[serde(
        default,
        deserialize_with = "deserialize_lax_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_in: Option<u64>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

/// Loose view over the error bodies the providers send back from their token endpoints.
///
/// Shapes seen in the wild:
/// - `{"error": "invalid_grant", "error_description": "Bad code"}`
/// - `{"error": {"message": "Invalid verification code", "code": 100}}`
/// - `{"code": 40001, "message": "Auth code expired"}`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProviderErrorBody {
    /// Best human-readable error text, in order of specificity.
    pub fn provider_message(&self) -> Option<String> {
        let nested = self
            .error
            .as_ref()
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str);
        let flat = self.error.as_ref().and_then(Value::as_str);

        self.error_description
            .as_deref()
            .or(nested)
            .or(self.message.as_deref())
            .or(flat)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    }
}

/// Accepts `3600`, `"3600"` or `null`.
pub fn deserialize_lax_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_u64()),
        Some(Value::String(s)) => Ok(s.trim().parse::<u64>().ok()),
        Some(_) => Err(serde::de::Error::custom(
            "expected a number or a numeric string for expires_in",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expires_in_accepts_numeric_strings() {
        let body: StandardTokenBody = serde_json::from_value(json!({
            "access_token": "at",
            "expires_in": "5183944"
        }))
        .expect("token body");
        assert_eq!(body.expires_in, Some(5_183_944));
    }

    #[test]
    fn provider_message_prefers_description_then_nested_message() {
        let oauth: ProviderErrorBody = serde_json::from_value(json!({
            "error": "invalid_grant",
            "error_description": "Bad code"
        }))
        .unwrap();
        assert_eq!(oauth.provider_message().as_deref(), Some("Bad code"));

        let graph: ProviderErrorBody = serde_json::from_value(json!({
            "error": { "message": "Invalid verification code", "code": 100 }
        }))
        .unwrap();
        assert_eq!(
            graph.provider_message().as_deref(),
            Some("Invalid verification code")
        );

        let bare: ProviderErrorBody =
            serde_json::from_value(json!({ "error": "invalid_client" })).unwrap();
        assert_eq!(bare.provider_message().as_deref(), Some("invalid_client"));

        let empty = ProviderErrorBody::default();
        assert!(empty.provider_message().is_none());
    }
}
