//! Per-provider adapters and the registry that maps provider keys to them.
//!
//! An adapter owns everything that differs between platforms: where the token endpoint is,
//! which credentials it needs, how the request body is encoded, how the answer is read, and
//! which lookups land on the external account. The exchange engine and the identity resolver
//! only ever talk to [`ProviderAdapter`].

pub mod google_ads;
pub mod linkedin_ads;
pub mod meta_ads;
pub mod tiktok_ads;

mod kind;
mod registry;

pub use kind::{ProviderKind, UnknownProvider};
pub use registry::ProviderRegistry;

use crate::error::ExchangeError;
use crate::identity::LookupStep;
use crate::oauth_utils::{
    CanonicalToken, ClientCredentials, CredentialKeys, RequestEncoding, TokenRequest,
    parse_standard_token,
};
use axum::http::StatusCode;
use oauth2::{AuthorizationCode, RedirectUrl};
use url::Url;

pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn token_url(&self) -> &Url;

    fn credential_keys(&self) -> CredentialKeys;

    fn encoding(&self) -> RequestEncoding {
        RequestEncoding::Form
    }

    /// Body of the authorization-code exchange.
    fn build_token_request(
        &self,
        creds: &ClientCredentials,
        code: &AuthorizationCode,
        redirect_uri: &RedirectUrl,
    ) -> TokenRequest {
        TokenRequest::authorization_code(self.encoding(), creds, code, redirect_uri)
    }

    /// Reads the token endpoint's answer. The adapter, not the HTTP status alone, decides
    /// whether the exchange succeeded.
    fn parse_token_response(
        &self,
        status: StatusCode,
        body: &[u8],
    ) -> Result<CanonicalToken, ExchangeError> {
        parse_standard_token(status, body)
    }

    /// Lookups run in order to land on the external account. Empty means the provider has no
    /// way to identify the account and the sentinel identity is stored.
    fn identity_steps(&self) -> &[Box<dyn LookupStep>];
}

/// Joins `path` onto a versioned API base, keeping the base path.
///
/// `Url::join` is not usable here: Google paths such as `customers:listAccessibleCustomers`
/// would be read as a URL scheme.
pub(crate) fn api_endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}
