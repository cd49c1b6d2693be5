use super::{ProviderAdapter, ProviderKind};
use crate::config::EndpointConfig;
use crate::error::IdentityError;
use crate::identity::{AccountIdentity, AccountInfoLookup, AuthHeader, LookupStep};
use crate::oauth_utils::CredentialKeys;
use adbridge_schema::linkedin_ads::LinkedinAdAccountSearch;
use url::Url;

pub const CLIENT_ID_KEY: &str = "LINKEDIN_CLIENT_ID";
pub const CLIENT_SECRET_KEY: &str = "LINKEDIN_CLIENT_SECRET";

pub struct LinkedinAdsAdapter {
    token_url: Url,
    steps: Vec<Box<dyn LookupStep>>,
}

impl LinkedinAdsAdapter {
    pub fn new(cfg: &EndpointConfig) -> Self {
        Self {
            token_url: cfg.token_url.clone(),
            steps: vec![Box::new(AccountInfoLookup {
                name: "linkedin_ads.ad_accounts",
                api_url: cfg.api_url.clone(),
                path: "adAccountsV2?q=search&count=1",
                auth: AuthHeader::Bearer,
                credential_query: &[],
                parse: parse_ad_accounts,
            })],
        }
    }
}

impl ProviderAdapter for LinkedinAdsAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::LinkedinAds
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
    let search: LinkedinAdAccountSearch = serde_json::from_slice(body)?;
    let account = search.elements.first().ok_or(IdentityError::NoAccount)?;
    let id = account.external_id().ok_or(IdentityError::NoAccount)?;
    let name = account.name.clone().unwrap_or_else(|| id.clone());
    Ok(AccountIdentity::new(id, name, account.currency.clone()))
}
