use serde::{Deserialize, Serialize};

/// Graph API `GET /me/adaccounts?fields=account_id,name,currency` response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetaAdAccountList {
    #[serde(default)]
    pub data: Vec<MetaAdAccount>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetaAdAccount {
    /// Graph node id, `act_<account_id>`.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl MetaAdAccount {
    /// Numeric account id, falling back to the node id without its `act_` prefix.
    pub fn external_id(&self) -> Option<String> {
        self.account_id
            .clone()
            .or_else(|| {
                self.id
                    .as_deref()
                    .map(|id| id.strip_prefix("act_").unwrap_or(id).to_string())
            })
            .filter(|id| !id.is_empty())
    }
}
