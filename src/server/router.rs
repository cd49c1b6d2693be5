use crate::config::{Config, CredentialSource, ProviderDefaults};
use crate::db::DbActorHandle;
use crate::providers::ProviderRegistry;
use crate::server::guards::auth::RequireKeyAuth;
use crate::server::routes::{connect, deletion, integrations};

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
};
use base64::Engine as _;
use chrono::Duration as ChronoDuration;
use rand::RngCore;
use std::time::Instant;
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};
use url::Url;

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub const GATEWAY_USER_AGENT: &str = concat!("adbridge/", env!("CARGO_PKG_VERSION"));

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

/// Outbound client for token exchanges and account lookups.
///
/// Redirects are never followed; provider answers are read as they come.
pub fn build_client(defaults: &ProviderDefaults) -> reqwest::Client {
    let mut builder = reqwest::Client::builder()
        .user_agent(GATEWAY_USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(defaults.connect_timeout_secs))
        .timeout(Duration::from_secs(defaults.request_timeout_secs));

    if let Some(proxy_url) = defaults.proxy.as_ref() {
        let proxy = reqwest::Proxy::all(proxy_url.as_str())
            .expect("invalid proxy url for reqwest client");
        builder = builder.proxy(proxy);
    }

    builder.build().expect("failed to build reqwest client")
}

#[derive(Clone)]
pub struct GatewayState {
    pub registry: ProviderRegistry,
    pub db: DbActorHandle,
    pub client: reqwest::Client,
    pub credentials: Arc<dyn CredentialSource>,
    pub public_url: Arc<Url>,
    pub result_path: Arc<str>,
    pub state_ttl: ChronoDuration,
    pub gateway_key: Arc<str>,
}

impl GatewayState {
    pub fn new(cfg: &Config, db: DbActorHandle, credentials: Arc<dyn CredentialSource>) -> Self {
        let state_ttl = i64::try_from(cfg.connect.state_ttl_secs)
            .ok()
            .and_then(ChronoDuration::try_seconds)
            .unwrap_or(crate::state_token::STATE_TTL);

        Self {
            registry: ProviderRegistry::from_config(&cfg.providers),
            db,
            client: build_client(&cfg.providers.defaults),
            credentials,
            public_url: Arc::new(cfg.basic.public_url.clone()),
            result_path: Arc::from(cfg.connect.result_path.as_str()),
            state_ttl,
            gateway_key: Arc::from(cfg.basic.gateway_key.as_str()),
        }
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn access_log(req: Request, next: Next) -> Response {
    // Capture request metadata before moving `req` into the handler stack.
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let version = req.version();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(generate_request_id, str::to_string);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    // Always reflect `x-request-id`, even if the client didn't send one.
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let protocol = format_http_version(version);

    // Query strings are left out: callback URLs carry authorization codes.
    if status.is_server_error() {
        error!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else if status.is_client_error() {
        warn!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else {
        info!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    }

    resp
}

pub fn gateway_router(state: GatewayState) -> Router {
    let management = integrations::router().layer(middleware::from_extractor_with_state::<
        RequireKeyAuth,
        _,
    >(state.clone()));

    Router::new()
        .merge(connect::router())
        .merge(deletion::router())
        .merge(management)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}
