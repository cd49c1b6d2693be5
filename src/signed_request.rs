//! Verifier for `<signature>.<payload>` envelopes signed with HMAC-SHA256.
//!
//! Both halves are URL-safe base64. The MAC covers the payload half as transmitted (still
//! encoded), so the payload is only decoded once the signature checks out. Nothing here knows
//! which provider or callback is calling; it takes a secret and an envelope and returns the
//! payload or a rejection.

use crate::error::VerifyError;
use crate::utils::base64url;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Checks `signed_request` against `secret` and decodes its JSON payload.
pub fn verify<T: DeserializeOwned>(signed_request: &str, secret: &str) -> Result<T, VerifyError> {
    let (sig_b64, payload_b64) = signed_request
        .split_once('.')
        .ok_or(VerifyError::Malformed("missing '.' separator"))?;
    if sig_b64.is_empty() || payload_b64.is_empty() {
        return Err(VerifyError::Malformed("empty signature or payload"));
    }

    let signature =
        base64url::decode(sig_b64).ok_or(VerifyError::Malformed("signature is not base64url"))?;
    let expected = mac(secret, payload_b64);

    if signature.len() != expected.len() {
        return Err(VerifyError::SignatureMismatch);
    }
    if !bool::from(signature.as_slice().ct_eq(expected.as_slice())) {
        return Err(VerifyError::SignatureMismatch);
    }

    let payload = base64url::decode(payload_b64).ok_or(VerifyError::InvalidPayload)?;
    serde_json::from_slice(&payload).map_err(|_| VerifyError::InvalidPayload)
}

/// Builds an envelope the way a provider would. Used by tests and local tooling.
pub fn sign(payload: &[u8], secret: &str) -> String {
    let payload_b64 = base64url::encode(payload);
    let sig = mac(secret, &payload_b64);
    format!("{}.{payload_b64}", base64url::encode(sig))
}

fn mac(secret: &str, payload_b64: &str) -> Vec<u8> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(payload_b64.as_bytes());
    mac.finalize().into_bytes().to_vec()
}
