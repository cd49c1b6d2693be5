use super::google_ads::GoogleAdsAdapter;
use super::linkedin_ads::LinkedinAdsAdapter;
use super::meta_ads::MetaAdsAdapter;
use super::tiktok_ads::TiktokAdsAdapter;
use super::{ProviderAdapter, ProviderKind};
use crate::config::ProvidersConfig;
use std::{collections::HashMap, sync::Arc};
use tracing::info;

/// Provider key -> adapter.
///
/// Adding a platform means registering another adapter here; the exchange engine and the
/// identity resolver stay untouched.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn from_config(cfg: &ProvidersConfig) -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(GoogleAdsAdapter::new(&cfg.google_ads)));
        registry.register(Arc::new(MetaAdsAdapter::new(&cfg.meta_ads)));
        registry.register(Arc::new(LinkedinAdsAdapter::new(&cfg.linkedin_ads)));
        registry.register(Arc::new(TiktokAdsAdapter::new(&cfg.tiktok_ads)));

        for (kind, adapter) in &registry.adapters {
            info!(
                provider = %kind,
                token_url = %adapter.token_url(),
                encoding = ?adapter.encoding(),
                identity_steps = adapter.identity_steps().len(),
                "Provider adapter registered"
            );
        }
        registry
    }

    /// Adds or replaces the adapter for its provider.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(&kind).cloned()
    }

    /// Looks a provider up by its untrusted key.
    pub fn resolve(&self, key: &str) -> Option<Arc<dyn ProviderAdapter>> {
        key.parse::<ProviderKind>().ok().and_then(|k| self.get(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth_utils::RequestEncoding;

    #[test]
    fn default_registry_covers_every_provider() {
        let registry = ProviderRegistry::from_config(&ProvidersConfig::default());
        for kind in ProviderKind::ALL {
            let adapter = registry.get(kind).expect("adapter registered");
            assert_eq!(adapter.kind(), kind);
        }
        assert!(registry.resolve("tiktok_ads").is_some());
        assert!(registry.resolve("myspace").is_none());
    }

    #[test]
    fn only_tiktok_uses_json_bodies() {
        let registry = ProviderRegistry::from_config(&ProvidersConfig::default());
        for kind in ProviderKind::ALL {
            let expected = if kind == ProviderKind::TiktokAds {
                RequestEncoding::Json
            } else {
                RequestEncoding::Form
            };
            assert_eq!(registry.get(kind).unwrap().encoding(), expected, "{kind}");
        }
    }

    #[test]
    fn only_google_needs_more_than_one_lookup() {
        let registry = ProviderRegistry::from_config(&ProvidersConfig::default());
        for kind in ProviderKind::ALL {
            let steps = registry.get(kind).unwrap().identity_steps().len();
            if kind == ProviderKind::GoogleAds {
                assert_eq!(steps, 2);
            } else {
                assert_eq!(steps, 1, "{kind}");
            }
        }
    }
}
