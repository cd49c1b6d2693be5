//! External account identity resolution.
//!
//! Each adapter exposes an ordered list of [`LookupStep`]s. Most providers need a single
//! authenticated GET; others have to list accessible accounts first and then ask for details
//! of the one they picked. The resolver never fails: losing account metadata must not block
//! storing a connection, so every failure degrades to [`AccountIdentity::sentinel`].

use crate::config::CredentialSource;
use crate::error::IdentityError;
use crate::providers::{ProviderAdapter, ProviderKind, api_endpoint};
use crate::utils::logging::with_pretty_json_debug;
use async_trait::async_trait;
use oauth2::AccessToken;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Account id stored when the external account could not be determined.
pub const UNKNOWN_ACCOUNT_ID: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    pub id: String,
    pub name: String,
    pub currency: Option<String>,
}

impl AccountIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, currency: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            currency: currency.filter(|c| !c.trim().is_empty()),
        }
    }

    /// Placeholder identity used whenever resolution fails.
    pub fn sentinel(kind: ProviderKind) -> Self {
        Self {
            id: UNKNOWN_ACCOUNT_ID.to_string(),
            name: format!("{} account", kind.display_name()),
            currency: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.id == UNKNOWN_ACCOUNT_ID
    }
}

/// Everything a lookup step may need for its requests.
pub struct LookupContext<'a> {
    pub http: &'a reqwest::Client,
    pub access_token: &'a AccessToken,
    pub credentials: &'a dyn CredentialSource,
}

#[async_trait]
pub trait LookupStep: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// When `true`, a failure keeps the identity resolved by earlier steps.
    fn is_best_effort(&self) -> bool {
        false
    }

    /// Produces the next identity. `current` is the result of the previous step, `None` for
    /// the first one.
    async fn lookup(
        &self,
        ctx: &LookupContext<'_>,
        current: Option<&AccountIdentity>,
    ) -> Result<AccountIdentity, IdentityError>;
}

/// How the access token is attached to an account lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthHeader {
    /// `Authorization: Bearer <token>`.
    Bearer,
    /// Raw token under a provider-specific header name.
    Named(&'static str),
}

/// Parser turning an account-info body into an identity.
pub type AccountParser = fn(&[u8]) -> Result<AccountIdentity, IdentityError>;

/// Single authenticated GET against a provider's account-info endpoint.
pub struct AccountInfoLookup {
    pub name: &'static str,
    pub api_url: Url,
    /// Path below `api_url`, may carry a fixed query string.
    pub path: &'static str,
    pub auth: AuthHeader,
    /// Query parameters filled from credentials: `(param, credential key)`.
    pub credential_query: &'static [(&'static str, &'static str)],
    pub parse: AccountParser,
}

#[async_trait]
impl LookupStep for AccountInfoLookup {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn lookup(
        &self,
        ctx: &LookupContext<'_>,
        _current: Option<&AccountIdentity>,
    ) -> Result<AccountIdentity, IdentityError> {
        let mut url = api_endpoint(&self.api_url, self.path)?;
        if !self.credential_query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for &(param, key) in self.credential_query {
                let value = ctx
                    .credentials
                    .get(key)
                    .ok_or(IdentityError::MissingCredentials { key })?;
                pairs.append_pair(param, &value);
            }
        }

        let req = ctx.http.get(url);
        let req = match self.auth {
            AuthHeader::Bearer => req.bearer_auth(ctx.access_token.secret()),
            AuthHeader::Named(header) => req.header(header, ctx.access_token.secret()),
        };

        let body = fetch_body(req).await?;
        (self.parse)(&body)
    }
}

/// Sends a lookup request and returns the body of a successful answer.
///
/// Transport errors are stripped of their URL: lookup URLs can carry app credentials in the
/// query string and these errors end up in the logs.
pub(crate) async fn fetch_body(req: reqwest::RequestBuilder) -> Result<Vec<u8>, IdentityError> {
    let resp = req.send().await.map_err(reqwest::Error::without_url)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(IdentityError::UpstreamStatus(status));
    }
    let body = resp.bytes().await.map_err(reqwest::Error::without_url)?;
    Ok(body.to_vec())
}

/// Runs the adapter's lookup steps and returns the account they land on.
///
/// Never fails; see the module docs.
pub async fn resolve_identity(
    adapter: &dyn ProviderAdapter,
    ctx: &LookupContext<'_>,
) -> AccountIdentity {
    let kind = adapter.kind();
    let mut current: Option<AccountIdentity> = None;

    for step in adapter.identity_steps() {
        match step.lookup(ctx, current.as_ref()).await {
            Ok(identity) => {
                debug!(provider = %kind, step = step.name(), account_id = %identity.id, "Account lookup step resolved");
                current = Some(identity);
            }
            Err(err) if step.is_best_effort() && current.is_some() => {
                warn!(provider = %kind, step = step.name(), error = %err, "Optional account lookup failed; keeping earlier result");
            }
            Err(err) => {
                warn!(provider = %kind, step = step.name(), error = %err, "Account lookup failed; storing placeholder identity");
                return AccountIdentity::sentinel(kind);
            }
        }
    }

    match current {
        Some(identity) => {
            with_pretty_json_debug(&identity, |json| {
                debug!(provider = %kind, "Resolved account identity:\n{json}");
            });
            identity
        }
        None => {
            warn!(provider = %kind, "Provider has no account lookup; storing placeholder identity");
            AccountIdentity::sentinel(kind)
        }
    }
}
