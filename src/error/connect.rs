use super::oauth::{ExchangeError, StateError};
use crate::providers::ProviderKind;
use thiserror::Error as ThisError;

/// Terminal outcome of a failed connect callback.
///
/// Every variant is reported to the application as `?error=<category>&error_description=<text>`
/// on the redirect; nothing here is ever rendered as a JSON body.
#[derive(Debug, ThisError)]
pub enum ConnectError {
    #[error("provider declined authorization: {0}")]
    ProviderDeclined(String),

    #[error("missing code or state")]
    MissingParams,

    #[error("invalid state token")]
    InvalidState,

    #[error("state token expired")]
    ExpiredState,

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// `key` goes to the server log only; the redirect names the provider.
    #[error("{provider} credentials not configured: {key} is missing")]
    Config {
        provider: ProviderKind,
        key: &'static str,
    },

    #[error("token exchange failed: {0}")]
    Token(String),

    #[error("no access token received")]
    NoToken,

    #[error("failed to store integration: {0}")]
    Db(String),
}

impl ConnectError {
    /// Stable error category used as the `error` query parameter.
    pub fn category(&self) -> &'static str {
        match self {
            ConnectError::ProviderDeclined(_) => "provider_declined",
            ConnectError::MissingParams => "missing_params",
            ConnectError::InvalidState => "invalid_state",
            ConnectError::ExpiredState => "expired_state",
            ConnectError::UnknownProvider(_) => "unknown_provider",
            ConnectError::Config { .. } => "config_error",
            ConnectError::Token(_) => "token_error",
            ConnectError::NoToken => "no_token",
            ConnectError::Db(_) => "db_error",
        }
    }

    /// Human-readable text used as the `error_description` query parameter.
    ///
    /// Provider text is passed through verbatim; internal failures get a fixed message.
    pub fn description(&self) -> String {
        match self {
            ConnectError::ProviderDeclined(text) | ConnectError::Token(text) => text.clone(),
            ConnectError::MissingParams => "Missing code or state parameter".to_string(),
            ConnectError::InvalidState => "Invalid state parameter".to_string(),
            ConnectError::ExpiredState => {
                "Authorization request expired, please try again".to_string()
            }
            ConnectError::UnknownProvider(p) => format!("Unknown provider: {p}"),
            ConnectError::Config { provider, .. } => {
                format!("{} integration is not configured", provider.display_name())
            }
            ConnectError::NoToken => "No access token received".to_string(),
            ConnectError::Db(_) => "Failed to save integration".to_string(),
        }
    }
}

impl From<StateError> for ConnectError {
    fn from(e: StateError) -> Self {
        match e {
            StateError::Malformed => ConnectError::InvalidState,
            StateError::Expired { .. } => ConnectError::ExpiredState,
        }
    }
}

impl ConnectError {
    /// Maps a failed exchange for `provider` onto the connect taxonomy.
    pub fn from_exchange(provider: ProviderKind, e: ExchangeError) -> Self {
        match e {
            ExchangeError::MissingCredentials { key } => ConnectError::Config { provider, key },
            ExchangeError::Rejected { message, .. } => ConnectError::Token(message),
            ExchangeError::Request(_) | ExchangeError::Endpoint(_) => {
                ConnectError::Token("Token exchange failed".to_string())
            }
            ExchangeError::EmptyToken => ConnectError::NoToken,
        }
    }
}
