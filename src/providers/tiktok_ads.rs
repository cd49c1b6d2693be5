//! TikTok for Business.
//!
//! The odd one out: the token request is a JSON body with its own field names, and every
//! answer is wrapped in a `{code, message, data}` envelope that reports failures with HTTP 200.

use super::{ProviderAdapter, ProviderKind};
use crate::config::EndpointConfig;
use crate::error::{ExchangeError, IdentityError};
use crate::identity::{AccountIdentity, AccountInfoLookup, AuthHeader, LookupStep};
use crate::oauth_utils::{
    CanonicalToken, ClientCredentials, CredentialKeys, GENERIC_EXCHANGE_ERROR, RequestEncoding,
    TokenRequest, provider_error_message,
};
use adbridge_schema::tiktok_ads::{TiktokAdvertiserList, TiktokEnvelope, TiktokTokenData};
use adbridge_schema::TiktokTokenRequest;
use axum::http::StatusCode;
use oauth2::{AuthorizationCode, RedirectUrl};
use url::Url;

pub const CLIENT_ID_KEY: &str = "TIKTOK_APP_ID";
pub const CLIENT_SECRET_KEY: &str = "TIKTOK_APP_SECRET";

const ACCESS_TOKEN_HEADER: &str = "Access-Token";

pub struct TiktokAdsAdapter {
    token_url: Url,
    steps: Vec<Box<dyn LookupStep>>,
}

impl TiktokAdsAdapter {
    pub fn new(cfg: &EndpointConfig) -> Self {
        Self {
            token_url: cfg.token_url.clone(),
            steps: vec![Box::new(AccountInfoLookup {
                name: "tiktok_ads.advertisers",
                api_url: cfg.api_url.clone(),
                path: "oauth2/advertiser/get/",
                auth: AuthHeader::Named(ACCESS_TOKEN_HEADER),
                credential_query: &[("app_id", CLIENT_ID_KEY), ("secret", CLIENT_SECRET_KEY)],
                parse: parse_advertisers,
            })],
        }
    }
}

impl ProviderAdapter for TiktokAdsAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::TiktokAds
    }

    fn token_url(&self) -> &Url {
        &self.token_url
    }

    fn credential_keys(&self) -> CredentialKeys {
        CredentialKeys {
            client_id: CLIENT_ID_KEY,
            client_secret: CLIENT_SECRET_KEY,
        }
    }

    fn encoding(&self) -> RequestEncoding {
        RequestEncoding::Json
    }

    /// No `redirect_uri` or `grant_type`: the Business API only wants app id, secret and code.
    fn build_token_request(
        &self,
        creds: &ClientCredentials,
        code: &AuthorizationCode,
        _redirect_uri: &RedirectUrl,
    ) -> TokenRequest {
        let body = TiktokTokenRequest {
            app_id: creds.client_id.as_str(),
            secret: creds.client_secret.secret(),
            auth_code: code.secret(),
        };
        TokenRequest::Json(serde_json::to_value(body).unwrap_or_default())
    }

    fn parse_token_response(
        &self,
        status: StatusCode,
        body: &[u8],
    ) -> Result<CanonicalToken, ExchangeError> {
        let Ok(envelope) = serde_json::from_slice::<TiktokEnvelope<TiktokTokenData>>(body) else {
            let message =
                provider_error_message(body).unwrap_or_else(|| GENERIC_EXCHANGE_ERROR.to_string());
            return Err(ExchangeError::rejected(Some(status), message));
        };

        if !envelope.is_ok() {
            // Gateway errors and some OAuth failures arrive in the standard error shape instead.
            let message = envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .or_else(|| provider_error_message(body))
                .unwrap_or_else(|| GENERIC_EXCHANGE_ERROR.to_string());
            return Err(ExchangeError::rejected(Some(status), message));
        }

        let data = envelope.data.unwrap_or_default();
        CanonicalToken::from_parts(status, data.access_token, data.refresh_token, data.expires_in)
    }

    fn identity_steps(&self) -> &[Box<dyn LookupStep>] {
        &self.steps
    }
}

fn parse_advertisers(body: &[u8]) -> Result<AccountIdentity, IdentityError> {
    let envelope: TiktokEnvelope<TiktokAdvertiserList> = serde_json::from_slice(body)?;
    if !envelope.is_ok() {
        return Err(IdentityError::Parse(
            envelope
                .message
                .unwrap_or_else(|| format!("code {}", envelope.code)),
        ));
    }
    let list = envelope.data.unwrap_or_default();
    let advertiser = list.list.first().ok_or(IdentityError::NoAccount)?;
    let id = advertiser.external_id().ok_or(IdentityError::NoAccount)?;
    let name = advertiser
        .advertiser_name
        .clone()
        .unwrap_or_else(|| id.clone());
    Ok(AccountIdentity::new(id, name, advertiser.currency.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvidersConfig;
    use oauth2::{ClientId, ClientSecret};

    fn adapter() -> TiktokAdsAdapter {
        TiktokAdsAdapter::new(&ProvidersConfig::default().tiktok_ads)
    }

    #[test]
    fn token_request_is_json_with_tiktok_field_names() {
        let creds = ClientCredentials {
            client_id: ClientId::new("app-1".into()),
            client_secret: ClientSecret::new("s3cret".into()),
        };
        let req = adapter().build_token_request(
            &creds,
            &AuthorizationCode::new("code-9".into()),
            &RedirectUrl::new("http://localhost/cb".into()).unwrap(),
        );
        match req {
            TokenRequest::Json(body) => assert_eq!(
                body,
                serde_json::json!({"app_id":"app-1","secret":"s3cret","auth_code":"code-9"})
            ),
            TokenRequest::Form(_) => panic!("expected a JSON body"),
        }
    }

    #[test]
    fn nested_token_normalizes_to_canonical_shape() {
        let token = adapter()
            .parse_token_response(
                StatusCode::OK,
                br#"{"code":0,"message":"OK","request_id":"1","data":{"access_token":"tt-at","advertiser_ids":["7001"],"scope":[4]}}"#,
            )
            .expect("token");
        assert_eq!(token.access_token.secret(), "tt-at");
        assert!(token.refresh_token.is_none());
        assert_eq!(token.expires_in, None);
    }

    #[test]
    fn status_wrapper_failure_is_rejected_despite_http_200() {
        let err = adapter()
            .parse_token_response(
                StatusCode::OK,
                br#"{"code":40110,"message":"Auth code is expired","data":{}}"#,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Rejected { ref message, .. } if message == "Auth code is expired"
        ));
    }

    #[test]
    fn standard_error_body_keeps_provider_text() {
        let err = adapter()
            .parse_token_response(
                StatusCode::BAD_REQUEST,
                br#"{"error":"invalid_grant","error_description":"invalid_grant"}"#,
            )
            .unwrap_err();
        match err {
            ExchangeError::Rejected { status, message } => {
                assert_eq!(status, Some(StatusCode::BAD_REQUEST));
                assert_eq!(message, "invalid_grant");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = adapter()
            .parse_token_response(StatusCode::BAD_GATEWAY, br#"{"code":50000}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Rejected { ref message, .. } if message == GENERIC_EXCHANGE_ERROR
        ));
    }

    #[tokio::test]
    async fn failed_lookup_does_not_leak_the_app_secret() {
        use crate::config::StaticCredentials;
        use crate::identity::{LookupContext, resolve_identity};
        use oauth2::AccessToken;

        let adapter = TiktokAdsAdapter::new(&EndpointConfig {
            token_url: Url::parse("http://127.0.0.1:1/oauth2/access_token/").unwrap(),
            api_url: Url::parse("http://127.0.0.1:1/open_api/v1.3/").unwrap(),
        });
        let http = reqwest::Client::new();
        let token = AccessToken::new("tt-at".to_string());
        let creds = StaticCredentials::new([
            (CLIENT_ID_KEY, "app-1"),
            (CLIENT_SECRET_KEY, "TOPSECRET42"),
        ]);
        let ctx = LookupContext {
            http: &http,
            access_token: &token,
            credentials: &creds,
        };

        let err = adapter.identity_steps()[0]
            .lookup(&ctx, None)
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::Request(_)));
        let rendered = format!("{err} {err:?}");
        assert!(!rendered.contains("TOPSECRET42"), "{rendered}");

        assert!(resolve_identity(&adapter, &ctx).await.is_sentinel());
    }

    #[test]
    fn empty_nested_token_is_reported_as_empty() {
        let err = adapter()
            .parse_token_response(
                StatusCode::OK,
                br#"{"code":0,"message":"OK","data":{"access_token":""}}"#,
            )
            .unwrap_err();
        assert!(matches!(err, ExchangeError::EmptyToken));
    }

    #[test]
    fn advertiser_list_yields_first_advertiser() {
        let identity = parse_advertisers(
            br#"{"code":0,"message":"OK","data":{"list":[{"advertiser_id":7001,"advertiser_name":"Acme TT"}]}}"#,
        )
        .unwrap();
        assert_eq!(identity, AccountIdentity::new("7001", "Acme TT", None));
    }
}
