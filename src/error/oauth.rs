use axum::http::StatusCode;
use thiserror::Error as ThisError;

/// Why a state token could not be used.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum StateError {
    #[error("state token is malformed")]
    Malformed,

    #[error("state token expired {age_secs}s after issue")]
    Expired { age_secs: i64 },
}

/// Failure of the authorization-code exchange.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
    /// A client credential is not configured.
    #[error("missing credential {key}")]
    MissingCredentials { key: &'static str },

    #[error("token endpoint unreachable: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid token endpoint url: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The provider refused the code, or its answer carried no usable token.
    #[error("token endpoint rejected the exchange: {message}")]
    Rejected {
        status: Option<StatusCode>,
        message: String,
    },

    /// The provider answered with an access token that is empty.
    #[error("token endpoint returned an empty access token")]
    EmptyToken,
}

impl ExchangeError {
    pub(crate) fn rejected(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        ExchangeError::Rejected {
            status,
            message: message.into(),
        }
    }
}

/// Failure of one account lookup step. Never escapes the identity resolver.
#[derive(Debug, ThisError)]
pub enum IdentityError {
    #[error("missing credential {key}")]
    MissingCredentials { key: &'static str },

    #[error("account lookup request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid account lookup url: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("account lookup returned status {0}")]
    UpstreamStatus(StatusCode),

    #[error("account lookup body unusable: {0}")]
    Parse(String),

    #[error("no ad account visible to this token")]
    NoAccount,

    #[error("lookup step needs a previously resolved account")]
    MissingPrevious,
}

impl From<serde_json::Error> for IdentityError {
    fn from(e: serde_json::Error) -> Self {
        IdentityError::Parse(e.to_string())
    }
}
