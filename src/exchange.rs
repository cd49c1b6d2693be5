//! Authorization code to token exchange.
//!
//! The engine knows nothing about individual providers: request shape and the final
//! accept/reject decision both come from the [`ProviderAdapter`].

use crate::config::CredentialSource;
use crate::error::ExchangeError;
use crate::oauth_utils::{CanonicalToken, ClientCredentials, TokenRequest};
use crate::providers::ProviderAdapter;
use axum::http::header::ACCEPT;
use oauth2::{AuthorizationCode, RedirectUrl};
use tracing::{debug, warn};

/// Exchanges `code` at the adapter's token endpoint.
///
/// Client credentials are read from `credentials` on every call. Exactly one HTTP request is
/// made; failures are reported as they come, without retries.
pub async fn exchange(
    http: &reqwest::Client,
    credentials: &dyn CredentialSource,
    adapter: &dyn ProviderAdapter,
    code: &AuthorizationCode,
    redirect_uri: &RedirectUrl,
) -> Result<CanonicalToken, ExchangeError> {
    let kind = adapter.kind();
    let creds = ClientCredentials::resolve(adapter.credential_keys(), credentials)?;

    let request = adapter.build_token_request(&creds, code, redirect_uri);
    let encoding = request.encoding();
    let builder = http
        .post(adapter.token_url().clone())
        .header(ACCEPT, "application/json");
    let builder = match request {
        TokenRequest::Form(pairs) => builder.form(&pairs),
        TokenRequest::Json(body) => builder.json(&body),
    };

    let resp = builder.send().await.map_err(|e| {
        warn!(provider = %kind, error = %e, "Token endpoint request failed");
        e
    })?;
    let status = resp.status();
    let body = resp.bytes().await?;
    debug!(provider = %kind, status = status.as_u16(), ?encoding, "Token endpoint answered");

    adapter
        .parse_token_response(status, &body)
        .inspect_err(|e| {
            warn!(provider = %kind, status = status.as_u16(), error = %e, "Token exchange rejected");
        })
}
