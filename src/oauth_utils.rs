use crate::config::CredentialSource;
use crate::error::ExchangeError;
use adbridge_schema::{ProviderErrorBody, StandardTokenBody};
use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use oauth2::{AccessToken, AuthorizationCode, ClientId, ClientSecret, RedirectUrl, RefreshToken};
use serde_json::{Map, Value};

/// Fallback error text when a provider gives nothing better.
pub(crate) const GENERIC_EXCHANGE_ERROR: &str = "Token exchange failed";

/// Provider-independent result of an authorization-code exchange.
///
/// Debug output of the secret fields is redacted by the `oauth2` newtypes.
#[derive(Debug, Clone)]
pub struct CanonicalToken {
    pub access_token: AccessToken,
    pub refresh_token: Option<RefreshToken>,
    /// Lifetime in seconds, when the provider reports one.
    pub expires_in: Option<u64>,
}

impl CanonicalToken {
    /// Builds a token from the raw fields a parser extracted.
    ///
    /// A missing access token means the provider answered without a token at all; an empty
    /// one is reported separately.
    pub(crate) fn from_parts(
        status: StatusCode,
        access_token: Option<String>,
        refresh_token: Option<String>,
        expires_in: Option<u64>,
    ) -> Result<Self, ExchangeError> {
        let access_token = access_token
            .ok_or_else(|| ExchangeError::rejected(Some(status), "No access token received"))?;
        if access_token.trim().is_empty() {
            return Err(ExchangeError::EmptyToken);
        }

        Ok(Self {
            access_token: AccessToken::new(access_token),
            refresh_token: refresh_token
                .filter(|t| !t.trim().is_empty())
                .map(RefreshToken::new),
            expires_in,
        })
    }

    /// Absolute expiry, `now + expires_in`; `None` for tokens without a reported lifetime.
    /// A reported lifetime of zero means already expired, not unlimited.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_in?).ok()?;
        now.checked_add_signed(Duration::try_seconds(secs)?)
    }
}

/// Names of the environment keys holding a provider's client id and secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialKeys {
    pub client_id: &'static str,
    pub client_secret: &'static str,
}

/// Client credentials resolved for one exchange.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
}

impl ClientCredentials {
    /// Reads both halves from `source`; the first missing key is reported.
    pub fn resolve(
        keys: CredentialKeys,
        source: &dyn CredentialSource,
    ) -> Result<Self, ExchangeError> {
        let client_id = source
            .get(keys.client_id)
            .ok_or(ExchangeError::MissingCredentials { key: keys.client_id })?;
        let client_secret = source
            .get(keys.client_secret)
            .ok_or(ExchangeError::MissingCredentials {
                key: keys.client_secret,
            })?;
        Ok(Self {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
        })
    }
}

/// Body encoding of a token request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEncoding {
    Form,
    Json,
}

/// Token request body, ready to be attached to a POST.
#[derive(Debug, Clone)]
pub enum TokenRequest {
    Form(Vec<(&'static str, String)>),
    Json(Value),
}

impl TokenRequest {
    pub fn encoding(&self) -> RequestEncoding {
        match self {
            TokenRequest::Form(_) => RequestEncoding::Form,
            TokenRequest::Json(_) => RequestEncoding::Json,
        }
    }

    /// Standard `authorization_code` grant fields, in the requested encoding.
    pub(crate) fn authorization_code(
        encoding: RequestEncoding,
        creds: &ClientCredentials,
        code: &AuthorizationCode,
        redirect_uri: &RedirectUrl,
    ) -> Self {
        let pairs = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.secret().to_string()),
            ("redirect_uri", redirect_uri.as_str().to_string()),
            ("client_id", creds.client_id.as_str().to_string()),
            ("client_secret", creds.client_secret.secret().to_string()),
        ];
        match encoding {
            RequestEncoding::Form => TokenRequest::Form(pairs),
            RequestEncoding::Json => TokenRequest::Json(Value::Object(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), Value::String(v)))
                    .collect::<Map<_, _>>(),
            )),
        }
    }
}

/// Provider error text from a raw body, if any can be found.
pub(crate) fn provider_error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ProviderErrorBody>(body)
        .ok()
        .and_then(|b| b.provider_message())
}

/// Parser for providers that answer with a top-level RFC 6749 token body.
pub(crate) fn parse_standard_token(
    status: StatusCode,
    body: &[u8],
) -> Result<CanonicalToken, ExchangeError> {
    if !status.is_success() {
        let message =
            provider_error_message(body).unwrap_or_else(|| GENERIC_EXCHANGE_ERROR.to_string());
        return Err(ExchangeError::rejected(Some(status), message));
    }

    let parsed: StandardTokenBody = serde_json::from_slice(body)
        .map_err(|_| ExchangeError::rejected(Some(status), GENERIC_EXCHANGE_ERROR))?;

    // Some endpoints answer 200 with an error object instead of a token.
    if parsed.access_token.is_none()
        && let Some(message) = provider_error_message(body)
    {
        return Err(ExchangeError::rejected(Some(status), message));
    }

    CanonicalToken::from_parts(
        status,
        parsed.access_token,
        parsed.refresh_token,
        parsed.expires_in,
    )
}
