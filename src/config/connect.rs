use serde::{Deserialize, Serialize};

/// Connect callback configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectConfig {
    /// Application path the callback redirects to once the flow ends, relative to
    /// `basic.public_url`. Outcome is appended as query parameters.
    /// TOML: `connect.result_path`. Default: `/integrations`.
    #[serde(default = "default_result_path")]
    pub result_path: String,

    /// Maximum accepted age of a state token, in seconds.
    /// TOML: `connect.state_ttl_secs`. Default: `600`.
    #[serde(default = "default_state_ttl_secs")]
    pub state_ttl_secs: u64,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            result_path: default_result_path(),
            state_ttl_secs: default_state_ttl_secs(),
        }
    }
}

fn default_result_path() -> String {
    "/integrations".to_string()
}

fn default_state_ttl_secs() -> u64 {
    600
}
