use serde::{Deserialize, Serialize};
use url::Url;

/// HTTP client settings shared by every provider call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderDefaults {
    /// Optional upstream HTTP proxy. If set, used for the reqwest client.
    /// TOML: `providers.defaults.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// TCP connect timeout for provider calls.
    /// TOML: `providers.defaults.connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout for provider calls. A call that runs past it is reported as a
    /// failed exchange or a failed identity lookup; nothing is retried.
    /// TOML: `providers.defaults.request_timeout_secs`. Default: `30`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            proxy: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Token endpoint and API base URL of one provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// Authorization-code exchange endpoint.
    pub token_url: Url,

    /// Base URL the account lookups are resolved against (versioned).
    pub api_url: Url,
}

/// All provider configurations.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub defaults: ProviderDefaults,

    /// TOML: `providers.google_ads.{token_url,api_url}`.
    #[serde(default = "default_google_ads")]
    pub google_ads: EndpointConfig,

    /// TOML: `providers.meta_ads.{token_url,api_url}`.
    #[serde(default = "default_meta_ads")]
    pub meta_ads: EndpointConfig,

    /// TOML: `providers.linkedin_ads.{token_url,api_url}`.
    #[serde(default = "default_linkedin_ads")]
    pub linkedin_ads: EndpointConfig,

    /// TOML: `providers.tiktok_ads.{token_url,api_url}`.
    #[serde(default = "default_tiktok_ads")]
    pub tiktok_ads: EndpointConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            defaults: ProviderDefaults::default(),
            google_ads: default_google_ads(),
            meta_ads: default_meta_ads(),
            linkedin_ads: default_linkedin_ads(),
            tiktok_ads: default_tiktok_ads(),
        }
    }
}

fn endpoints(token_url: &str, api_url: &str) -> EndpointConfig {
    EndpointConfig {
        token_url: Url::parse(token_url).expect("valid default token url"),
        api_url: Url::parse(api_url).expect("valid default api url"),
    }
}

fn default_google_ads() -> EndpointConfig {
    endpoints(
        "https://oauth2.googleapis.com/token",
        "https://googleads.googleapis.com/v17",
    )
}

fn default_meta_ads() -> EndpointConfig {
    endpoints(
        "https://graph.facebook.com/v19.0/oauth/access_token",
        "https://graph.facebook.com/v19.0",
    )
}

fn default_linkedin_ads() -> EndpointConfig {
    endpoints(
        "https://www.linkedin.com/oauth/v2/accessToken",
        "https://api.linkedin.com/v2",
    )
}

fn default_tiktok_ads() -> EndpointConfig {
    endpoints(
        "https://business-api.tiktok.com/open_api/v1.3/oauth2/access_token/",
        "https://business-api.tiktok.com/open_api/v1.3",
    )
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}
