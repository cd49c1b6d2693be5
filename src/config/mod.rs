mod basic;
mod connect;
mod credentials;
mod providers;

pub use basic::BasicConfig;
pub use connect::ConnectConfig;
pub use credentials::{CredentialSource, EnvCredentials, StaticCredentials};
pub use providers::{EndpointConfig, ProviderDefaults, ProvidersConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
///
/// Secrets (provider client credentials, the deletion webhook secret) are not part of this
/// struct; they are looked up through a [`CredentialSource`] when a request needs them.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Connect callback behaviour (see `connect` table in config.toml).
    #[serde(default)]
    pub connect: ConnectConfig,

    /// Provider endpoints and HTTP client settings (see `providers` table in config.toml).
    #[serde(default)]
    pub providers: ProvidersConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "ADBRIDGE_";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and
    /// `ADBRIDGE_`-prefixed environment variables (`ADBRIDGE_BASIC__LISTEN_PORT=9000`).
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration without validating required fields.
    ///
    /// Binaries should call [`Config::load`] instead so they never serve with an empty
    /// gateway key.
    pub fn from_optional_toml() -> Self {
        Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + optional config.toml + env): {err}")
        })
    }

    /// Loads configuration and validates required fields.
    pub fn load() -> Self {
        let cfg = Self::from_optional_toml();
        if cfg.basic.gateway_key.trim().is_empty() {
            panic!("basic.gateway_key must be set and non-empty");
        }
        cfg
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::load);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_nested_tables() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ADBRIDGE_BASIC__LISTEN_PORT", "9100");
            jail.set_env("ADBRIDGE_CONNECT__STATE_TTL_SECS", "120");
            jail.set_env("ADBRIDGE_BASIC__GATEWAY_KEY", "12345");

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.basic.listen_port, 9100);
            assert_eq!(cfg.connect.state_ttl_secs, 120);
            assert_eq!(cfg.basic.gateway_key, "12345");
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_merged_over_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [basic]
                public_url = "https://gateway.example.com"

                [connect]
                result_path = "/settings/integrations"

                [providers.tiktok_ads]
                api_url = "http://127.0.0.1:9999/open_api/v1.3"
                "#,
            )?;

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.basic.public_url.as_str(), "https://gateway.example.com/");
            assert_eq!(cfg.connect.result_path, "/settings/integrations");
            assert_eq!(
                cfg.providers.tiktok_ads.api_url.as_str(),
                "http://127.0.0.1:9999/open_api/v1.3"
            );
            // Untouched providers keep their defaults.
            assert!(
                cfg.providers
                    .google_ads
                    .token_url
                    .as_str()
                    .starts_with("https://oauth2.googleapis.com/")
            );
            Ok(())
        });
    }
}
