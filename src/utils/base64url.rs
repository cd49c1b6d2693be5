use base64::Engine as _;

/// Decode URL-safe base64 with or without `=` padding.
///
/// Providers disagree on padding, and the state token round-trips through browsers that may
/// keep or strip it, so both forms are accepted.
pub(crate) fn decode(input: &str) -> Option<Vec<u8>> {
    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(input)
        .or_else(|_| base64::engine::general_purpose::URL_SAFE.decode(input))
        .ok()
}

/// Encode as URL-safe base64 without padding.
pub(crate) fn encode(bytes: impl AsRef<[u8]>) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
