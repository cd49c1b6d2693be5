//! Google Ads.
//!
//! Form-encoded standard token exchange. There is no "who am I" endpoint for ad accounts, so
//! identity takes two lookups: list the customers the token can reach, then query the first
//! one for its display name and currency.

use super::{ProviderAdapter, ProviderKind, api_endpoint};
use crate::config::EndpointConfig;
use crate::error::IdentityError;
use crate::identity::{AccountIdentity, LookupContext, LookupStep, fetch_body};
use crate::oauth_utils::CredentialKeys;
use adbridge_schema::google_ads::{
    GoogleAdsSearchRequest, GoogleAdsSearchResponse, ListAccessibleCustomersResponse,
};
use async_trait::async_trait;
use url::Url;

pub const CLIENT_ID_KEY: &str = "GOOGLE_ADS_CLIENT_ID";
pub const CLIENT_SECRET_KEY: &str = "GOOGLE_ADS_CLIENT_SECRET";
/// Every Google Ads API call needs a developer token next to the OAuth token.
pub const DEVELOPER_TOKEN_KEY: &str = "GOOGLE_ADS_DEVELOPER_TOKEN";

const DEVELOPER_TOKEN_HEADER: &str = "developer-token";
const CUSTOMER_QUERY: &str =
    "SELECT customer.descriptive_name, customer.currency_code FROM customer LIMIT 1";

pub struct GoogleAdsAdapter {
    token_url: Url,
    steps: Vec<Box<dyn LookupStep>>,
}

impl GoogleAdsAdapter {
    pub fn new(cfg: &EndpointConfig) -> Self {
        Self {
            token_url: cfg.token_url.clone(),
            steps: vec![
                Box::new(ListAccessibleCustomers {
                    api_url: cfg.api_url.clone(),
                }),
                Box::new(CustomerDetails {
                    api_url: cfg.api_url.clone(),
                }),
            ],
        }
    }
}

impl ProviderAdapter for GoogleAdsAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GoogleAds
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

fn developer_token(ctx: &LookupContext<'_>) -> Result<String, IdentityError> {
    ctx.credentials
        .get(DEVELOPER_TOKEN_KEY)
        .ok_or(IdentityError::MissingCredentials {
            key: DEVELOPER_TOKEN_KEY,
        })
}

/// `GET customers:listAccessibleCustomers`; picks the first customer.
struct ListAccessibleCustomers {
    api_url: Url,
}

#[async_trait]
impl LookupStep for ListAccessibleCustomers {
    fn name(&self) -> &'static str {
        "google_ads.list_accessible_customers"
    }

    async fn lookup(
        &self,
        ctx: &LookupContext<'_>,
        _current: Option<&AccountIdentity>,
    ) -> Result<AccountIdentity, IdentityError> {
        let url = api_endpoint(&self.api_url, "customers:listAccessibleCustomers")?;
        let req = ctx
            .http
            .get(url)
            .bearer_auth(ctx.access_token.secret())
            .header(DEVELOPER_TOKEN_HEADER, developer_token(ctx)?);

        let body = fetch_body(req).await?;
        parse_accessible_customers(&body)
    }
}

/// Until the detail lookup answers, the raw customer id doubles as the display name.
pub(crate) fn parse_accessible_customers(body: &[u8]) -> Result<AccountIdentity, IdentityError> {
    let resp: ListAccessibleCustomersResponse = serde_json::from_slice(body)?;
    let id = resp.first_customer_id().ok_or(IdentityError::NoAccount)?;
    Ok(AccountIdentity::new(id, id, None))
}

/// `POST customers/{id}/googleAds:search` for the display name and currency.
struct CustomerDetails {
    api_url: Url,
}

#[async_trait]
impl LookupStep for CustomerDetails {
    fn name(&self) -> &'static str {
        "google_ads.customer_details"
    }

    fn is_best_effort(&self) -> bool {
        true
    }

    async fn lookup(
        &self,
        ctx: &LookupContext<'_>,
        current: Option<&AccountIdentity>,
    ) -> Result<AccountIdentity, IdentityError> {
        let current = current.ok_or(IdentityError::MissingPrevious)?;
        let url = api_endpoint(
            &self.api_url,
            &format!("customers/{}/googleAds:search", current.id),
        )?;
        let req = ctx
            .http
            .post(url)
            .bearer_auth(ctx.access_token.secret())
            .header(DEVELOPER_TOKEN_HEADER, developer_token(ctx)?)
            .header("login-customer-id", current.id.as_str())
            .json(&GoogleAdsSearchRequest {
                query: CUSTOMER_QUERY,
            });

        let body = fetch_body(req).await?;
        parse_customer_details(&body, current)
    }
}

pub(crate) fn parse_customer_details(
    body: &[u8],
    current: &AccountIdentity,
) -> Result<AccountIdentity, IdentityError> {
    let resp: GoogleAdsSearchResponse = serde_json::from_slice(body)?;
    let customer = resp.customer().ok_or(IdentityError::NoAccount)?;

    let name = customer
        .descriptive_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(current.name.as_str());

    Ok(AccountIdentity::new(
        current.id.as_str(),
        name,
        customer.currency_code.clone(),
    ))
}
