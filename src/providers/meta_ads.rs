//! Meta (Facebook) Marketing API.
//!
//! Form-encoded token exchange against the Graph API. Tokens carry a lifetime but no
//! refresh token.

use super::{ProviderAdapter, ProviderKind};
use crate::config::EndpointConfig;
use crate::error::IdentityError;
use crate::identity::{AccountIdentity, AccountInfoLookup, AuthHeader, LookupStep};
use crate::oauth_utils::CredentialKeys;
use adbridge_schema::meta_ads::MetaAdAccountList;
use url::Url;

pub const CLIENT_ID_KEY: &str = "META_APP_ID";
/// Also the shared secret of the data deletion callback.
pub const CLIENT_SECRET_KEY: &str = "META_APP_SECRET";

pub struct MetaAdsAdapter {
    token_url: Url,
    steps: Vec<Box<dyn LookupStep>>,
}

impl MetaAdsAdapter {
    pub fn new(cfg: &EndpointConfig) -> Self {
        Self {
            token_url: cfg.token_url.clone(),
            steps: vec![Box::new(AccountInfoLookup {
                name: "meta_ads.ad_accounts",
                api_url: cfg.api_url.clone(),
                path: "me/adaccounts?fields=account_id,name,currency&limit=1",
                auth: AuthHeader::Bearer,
                credential_query: &[],
                parse: parse_ad_accounts,
            })],
        }
    }
}

impl ProviderAdapter for MetaAdsAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::MetaAds
    }

    fn token_url(&self) -> &Url {
        &self.token_url
    }

    fn credential_keys(&self) -> CredentialKeys {
        CredentialKeys {
            client_id: CLIENT_ID_KEY,
            client_secret: CLIENT_SECRET_KEY,
        }
    }

    fn identity_steps(&self) -> &[Box<dyn LookupStep>] {
        &self.steps
    }
}

fn parse_ad_accounts(body: &[u8]) -> Result<AccountIdentity, IdentityError> {
    let list: MetaAdAccountList = serde_json::from_slice(body)?;
    let account = list.data.first().ok_or(IdentityError::NoAccount)?;
    let id = account.external_id().ok_or(IdentityError::NoAccount)?;
    let name = account.name.clone().unwrap_or_else(|| id.clone());
    Ok(AccountIdentity::new(id, name, account.currency.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvidersConfig;
    use crate::error::ExchangeError;
    use axum::http::StatusCode;

    #[test]
    fn token_response_normalizes_to_canonical_shape() {
        let adapter = MetaAdsAdapter::new(&ProvidersConfig::default().meta_ads);
        let token = adapter
            .parse_token_response(
                StatusCode::OK,
                br#"{"access_token":"EAAB","token_type":"bearer","expires_in":5183944}"#,
            )
            .expect("token");
        assert_eq!(token.access_token.secret(), "EAAB");
        assert!(token.refresh_token.is_none());
        assert_eq!(token.expires_in, Some(5_183_944));
    }

    #[test]
    fn graph_error_object_is_surfaced() {
        let adapter = MetaAdsAdapter::new(&ProvidersConfig::default().meta_ads);
        let err = adapter
            .parse_token_response(
                StatusCode::BAD_REQUEST,
                br#"{"error":{"message":"This authorization code has expired.","type":"OAuthException","code":100}}"#,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Rejected { ref message, .. } if message == "This authorization code has expired."
        ));
    }

    #[test]
    fn ad_account_prefers_numeric_account_id() {
        let identity = parse_ad_accounts(
            br#"{"data":[{"id":"act_998877","account_id":"998877","name":"Acme EU","currency":"EUR"}]}"#,
        )
        .unwrap();
        assert_eq!(identity, AccountIdentity::new("998877", "Acme EU", Some("EUR".into())));

        let node_only = parse_ad_accounts(br#"{"data":[{"id":"act_5"}]}"#).unwrap();
        assert_eq!(node_only, AccountIdentity::new("5", "5", None));

        assert!(matches!(
            parse_ad_accounts(br#"{"data":[]}"#),
            Err(IdentityError::NoAccount)
        ));
    }
}
