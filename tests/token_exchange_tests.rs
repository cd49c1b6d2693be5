mod common;

use adbridge::config::StaticCredentials;
use adbridge::error::ExchangeError;
use adbridge::exchange::exchange;
use adbridge::providers::{ProviderKind, ProviderRegistry};
use common::*;
use oauth2::{AuthorizationCode, RedirectUrl};

fn redirect_uri() -> RedirectUrl {
    RedirectUrl::new("https://app.test/oauth/callback".to_string()).unwrap()
}

#[tokio::test]
async fn every_provider_yields_the_canonical_token() {
    let (mock, captured) = spawn_mock_providers().await;
    let registry = ProviderRegistry::from_config(&test_config(&mock).providers);
    let http = reqwest::Client::new();
    let creds = all_credentials();

    let expected = [
        (ProviderKind::GoogleAds, "google-at", true, Some(3599)),
        (ProviderKind::MetaAds, "meta-at", false, Some(5_183_944)),
        (ProviderKind::LinkedinAds, "linkedin-at", true, Some(5_184_000)),
        (ProviderKind::TiktokAds, "tiktok-at", false, None),
    ];

    for (kind, access, has_refresh, expires_in) in expected {
        let adapter = registry.get(kind).expect("registered");
        let token = exchange(
            &http,
            &creds,
            adapter.as_ref(),
            &AuthorizationCode::new("good".to_string()),
            &redirect_uri(),
        )
        .await
        .unwrap_or_else(|e| panic!("{kind}: {e}"));

        assert_eq!(token.access_token.secret(), access, "{kind}");
        assert_eq!(token.refresh_token.is_some(), has_refresh, "{kind}");
        assert_eq!(token.expires_in, expires_in, "{kind}");
    }
    assert_eq!(captured.token_calls(), 4);

    let tiktok = captured
        .requests()
        .into_iter()
        .find(|r| r.path == "/tiktok/token")
        .unwrap();
    assert_eq!(
        tiktok.headers.get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
}

#[tokio::test]
async fn missing_secret_fails_without_calling_the_endpoint() {
    let (mock, captured) = spawn_mock_providers().await;
    let registry = ProviderRegistry::from_config(&test_config(&mock).providers);
    let creds = StaticCredentials::new([("LINKEDIN_CLIENT_ID", "linkedin-client")]);

    let err = exchange(
        &reqwest::Client::new(),
        &creds,
        registry.get(ProviderKind::LinkedinAds).unwrap().as_ref(),
        &AuthorizationCode::new("good".to_string()),
        &redirect_uri(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        ExchangeError::MissingCredentials {
            key: "LINKEDIN_CLIENT_SECRET"
        }
    ));
    assert_eq!(captured.token_calls(), 0);
}

#[tokio::test]
async fn unreachable_endpoint_is_reported_once() {
    let mut cfg = test_config(&url::Url::parse("http://127.0.0.1:9").unwrap());
    cfg.providers.meta_ads.token_url = url::Url::parse("http://127.0.0.1:1/token").unwrap();
    let registry = ProviderRegistry::from_config(&cfg.providers);

    let err = exchange(
        &reqwest::Client::new(),
        &all_credentials(),
        registry.get(ProviderKind::MetaAds).unwrap().as_ref(),
        &AuthorizationCode::new("good".to_string()),
        &redirect_uri(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ExchangeError::Request(_)));
}
