//! Opaque state carried through the provider's authorization redirect.
//!
//! The token is URL-safe base64 over a small JSON object. It holds no secret and is not an
//! authorization proof: it only tells the callback which user started the flow and for which
//! provider. Freshness is checked separately from decoding so an expired token can be told
//! apart from a malformed one.

use crate::error::StateError;
use crate::providers::ProviderKind;
use crate::utils::base64url;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Default maximum age of a state token.
pub const STATE_TTL: Duration = Duration::minutes(10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateToken {
    pub user_id: String,
    /// Provider key as sent by the initiating page. Kept as text so an unknown provider is
    /// reported as such rather than as a malformed token.
    pub provider: String,
    /// Issue time, milliseconds since the Unix epoch.
    pub issued_at: i64,
}

impl StateToken {
    pub fn new(user_id: impl Into<String>, provider: ProviderKind) -> Self {
        Self::issued(user_id, provider, Utc::now())
    }

    pub fn issued(user_id: impl Into<String>, provider: ProviderKind, at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            provider: provider.as_str().to_string(),
            issued_at: at.timestamp_millis(),
        }
    }

    pub fn encode(&self) -> String {
        // Serializing a struct of strings and an integer cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        base64url::encode(json)
    }

    /// Reverses [`StateToken::encode`]. Any decoding or parsing problem is `Malformed`.
    pub fn decode(token: &str) -> Result<Self, StateError> {
        let bytes = base64url::decode(token.trim()).ok_or(StateError::Malformed)?;
        let state: StateToken =
            serde_json::from_slice(&bytes).map_err(|_| StateError::Malformed)?;
        if state.user_id.trim().is_empty() || state.provider.trim().is_empty() {
            return Err(StateError::Malformed);
        }
        Ok(state)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.issued_at).single()
    }

    /// Accepts the token when `now - issued_at <= ttl`, compared in whole milliseconds like
    /// `issued_at` itself.
    pub fn check_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> Result<(), StateError> {
        self.issued_at().ok_or(StateError::Malformed)?;
        let age_ms = now.timestamp_millis().saturating_sub(self.issued_at);
        if age_ms > ttl.num_milliseconds() {
            return Err(StateError::Expired {
                age_secs: age_ms / 1000,
            });
        }
        Ok(())
    }
}

/// Shorthand for `StateToken::new(user_id, provider).encode()`.
pub fn encode(user_id: &str, provider: ProviderKind) -> String {
    StateToken::new(user_id, provider).encode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reverses_encode_for_every_provider() {
        for provider in ProviderKind::ALL {
            let before = Utc::now();
            let token = encode("user-42", provider);
            let state = StateToken::decode(&token).expect("decodes");

            assert_eq!(state.user_id, "user-42");
            assert_eq!(state.provider, provider.as_str());
            let issued = state.issued_at().expect("valid timestamp");
            assert!((issued - before).num_seconds().abs() <= 1);
            assert!(state.check_fresh(Utc::now(), STATE_TTL).is_ok());
        }
    }

    #[test]
    fn token_is_url_safe() {
        let token = encode("user/with+odd?chars", ProviderKind::LinkedinAds);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn stale_token_is_expired_not_malformed() {
        let issued = Utc::now() - Duration::minutes(11);
        let token = StateToken::issued("u1", ProviderKind::MetaAds, issued).encode();

        let state = StateToken::decode(&token).expect("well-formed");
        let err = state.check_fresh(Utc::now(), STATE_TTL).unwrap_err();
        assert!(matches!(err, StateError::Expired { age_secs } if age_secs >= 660));
    }

    #[test]
    fn token_at_exact_ttl_is_still_fresh() {
        let now = Utc::now();
        let state = StateToken::issued("u1", ProviderKind::GoogleAds, now - STATE_TTL);
        assert!(state.check_fresh(now, STATE_TTL).is_ok());

        // Sub-millisecond parts of `now` do not push a token over the limit.
        let issued = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let state = StateToken::issued("u1", ProviderKind::GoogleAds, issued);
        let at_limit = issued + STATE_TTL + Duration::microseconds(999);
        assert!(state.check_fresh(at_limit, STATE_TTL).is_ok());

        let past_limit = issued + STATE_TTL + Duration::milliseconds(1);
        assert!(matches!(
            state.check_fresh(past_limit, STATE_TTL),
            Err(StateError::Expired { age_secs: 600 })
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        for raw in ["", "%%%", "bm90IGpzb24", "e30"] {
            assert_eq!(StateToken::decode(raw), Err(StateError::Malformed), "{raw}");
        }
    }

    #[test]
    fn unknown_provider_still_decodes() {
        let raw = base64url::encode(br#"{"user_id":"u1","provider":"myspace","issued_at":1}"#);
        let state = StateToken::decode(&raw).expect("decodes");
        assert_eq!(state.provider, "myspace");
    }
}
