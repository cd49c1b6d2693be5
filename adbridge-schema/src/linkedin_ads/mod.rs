use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /v2/adAccountsV2?q=search` response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LinkedinAdAccountSearch {
    #[serde(default)]
    pub elements: Vec<LinkedinAdAccount>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LinkedinAdAccount {
    /// Numeric in practice; kept as a raw value so string ids also parse.
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl LinkedinAdAccount {
    pub fn external_id(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}
