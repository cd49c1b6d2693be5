use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The external ad platforms a user can connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ProviderKind {
    GoogleAds,
    MetaAds,
    LinkedinAds,
    TiktokAds,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::GoogleAds,
        ProviderKind::MetaAds,
        ProviderKind::LinkedinAds,
        ProviderKind::TiktokAds,
    ];

    /// Stable key used in state tokens, URLs and the `provider` column.
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::GoogleAds => "google_ads",
            ProviderKind::MetaAds => "meta_ads",
            ProviderKind::LinkedinAds => "linkedin_ads",
            ProviderKind::TiktokAds => "tiktok_ads",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::GoogleAds => "Google Ads",
            ProviderKind::MetaAds => "Meta Ads",
            ProviderKind::LinkedinAds => "LinkedIn Ads",
            ProviderKind::TiktokAds => "TikTok Ads",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl fmt::Display for UnknownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown provider: {}", self.0)
    }
}

impl std::error::Error for UnknownProvider {}

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}
