#![allow(dead_code)]

use adbridge::config::{Config, EndpointConfig, StaticCredentials};
use adbridge::db::DbActorHandle;
use adbridge::server::router::{GatewayState, gateway_router};
use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Path, State},
    http::{HeaderMap, Request, StatusCode, header},
    response::Response,
    routing::{any, post},
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;

pub const GATEWAY_KEY: &str = "gw-test-key";
pub const META_SECRET: &str = "meta-app-secret";
pub const PUBLIC_URL: &str = "https://app.test";

pub fn unique_sqlite_path(prefix: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "adbridge-{prefix}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    temp_path
}

pub async fn spawn_db(prefix: &str) -> (DbActorHandle, std::path::PathBuf) {
    let temp_path = unique_sqlite_path(prefix);
    let database_url = format!("sqlite:{}", temp_path.display());
    (adbridge::db::spawn(&database_url).await, temp_path)
}

/// Runs `sql` against the database file behind a spawned store, outside the actor.
pub async fn sqlite_exec(temp_path: &std::path::Path, sql: &str) {
    let database_url = format!("sqlite:{}", temp_path.display());
    let pool = sqlx::SqlitePool::connect(&database_url)
        .await
        .expect("open test database");
    sqlx::raw_sql(sql).execute(&pool).await.expect("run test sql");
    pool.close().await;
}

pub async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{addr}")).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

#[derive(Debug, Clone)]
pub struct Captured {
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[derive(Clone, Default)]
pub struct CaptureState {
    pub reqs: Arc<Mutex<Vec<Captured>>>,
}

impl CaptureState {
    pub fn requests(&self) -> Vec<Captured> {
        self.reqs.lock().unwrap().clone()
    }

    pub fn token_calls(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.path.ends_with("/token"))
            .count()
    }

    fn push(&self, path: String, query: Option<&str>, headers: HeaderMap, body: &[u8]) {
        let query = query
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        self.reqs.lock().unwrap().push(Captured {
            path,
            query,
            headers,
            body: body.to_vec(),
        });
    }
}

/// Authorization code behaviour of the mock token endpoints:
/// - `good`: a token for the provider
/// - `noid`: a token the account endpoints refuse
/// - `bad`: `invalid_grant`
/// - `empty`: an empty access token
fn token_answer(provider: &str, code: &str) -> (StatusCode, Value) {
    let access = match code {
        "good" => format!("{provider}-at"),
        "noid" => "noid-at".to_string(),
        "empty" => String::new(),
        _ => {
            return if provider == "tiktok" {
                (
                    StatusCode::OK,
                    json!({"code": 40110, "message": "Auth code is expired", "data": {}}),
                )
            } else {
                (
                    StatusCode::BAD_REQUEST,
                    json!({"error": "invalid_grant", "error_description": "invalid_grant"}),
                )
            };
        }
    };

    let body = match provider {
        "google" => json!({
            "access_token": access,
            "expires_in": 3599,
            "refresh_token": "google-rt",
            "token_type": "Bearer"
        }),
        "meta" => json!({"access_token": access, "token_type": "bearer", "expires_in": 5183944}),
        "linkedin" => json!({
            "access_token": access,
            "expires_in": 5184000,
            "refresh_token": "linkedin-rt",
            "refresh_token_expires_in": 31536000
        }),
        _ => json!({
            "code": 0,
            "message": "OK",
            "request_id": "req-1",
            "data": {"access_token": access, "advertiser_ids": ["7001"], "scope": [4]}
        }),
    };
    (StatusCode::OK, body)
}

async fn token_handler(
    State(state): State<CaptureState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    state.push(format!("/{provider}/token"), None, headers, &body);

    let code = if provider == "tiktok" {
        serde_json::from_slice::<Value>(&body)
            .ok()
            .and_then(|v| v.get("auth_code").and_then(Value::as_str).map(str::to_string))
    } else {
        url::form_urlencoded::parse(&body)
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
    }
    .unwrap_or_default();

    let (status, body) = token_answer(&provider, &code);
    (status, Json(body))
}

fn presented_token(provider: &str, headers: &HeaderMap) -> Option<String> {
    if provider == "tiktok" {
        return headers
            .get("Access-Token")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn api_handler(
    State(state): State<CaptureState>,
    Path((provider, rest)): Path<(String, String)>,
    headers: HeaderMap,
    req: Request<Body>,
) -> (StatusCode, Json<Value>) {
    let query = req.uri().query().map(str::to_string);
    let body = axum::body::to_bytes(req.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let rest = rest.trim_matches('/').to_string();
    state.push(
        format!("/{provider}/api/{rest}"),
        query.as_deref(),
        headers.clone(),
        &body,
    );

    let expected = format!("{provider}-at");
    if presented_token(&provider, &headers).as_deref() != Some(expected.as_str()) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "backend unavailable"}})),
        );
    }

    let answer = match (provider.as_str(), rest.as_str()) {
        ("google", "customers:listAccessibleCustomers") => {
            json!({"resourceNames": ["customers/1234567890", "customers/555"]})
        }
        ("google", r) if r.ends_with("googleAds:search") => {
            if headers.get("developer-token").is_none() {
                return (StatusCode::FORBIDDEN, Json(json!({"error": "no developer token"})));
            }
            json!({"results": [{"customer": {
                "resourceName": "customers/1234567890",
                "descriptiveName": "Acme Google",
                "currencyCode": "USD"
            }}]})
        }
        ("meta", "me/adaccounts") => json!({"data": [{
            "id": "act_998877",
            "account_id": "998877",
            "name": "Acme Meta",
            "currency": "EUR"
        }]}),
        ("linkedin", "adAccountsV2") => json!({"elements": [{
            "id": 507404993,
            "name": "Acme LinkedIn",
            "currency": "USD",
            "status": "ACTIVE"
        }]}),
        ("tiktok", "oauth2/advertiser/get") => json!({
            "code": 0,
            "message": "OK",
            "data": {"list": [{"advertiser_id": 7001, "advertiser_name": "Acme TikTok"}]}
        }),
        _ => return (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))),
    };
    (StatusCode::OK, Json(answer))
}

/// Local stand-in for all four platforms, below `/{google,meta,linkedin,tiktok}`.
pub async fn spawn_mock_providers() -> (Url, CaptureState) {
    let captured = CaptureState::default();
    let mock = Router::new()
        .route("/{provider}/token", post(token_handler))
        .route("/{provider}/api/{*rest}", any(api_handler))
        .with_state(captured.clone());
    (spawn_test_server(mock).await, captured)
}

fn endpoints(base: &Url, provider: &str) -> EndpointConfig {
    EndpointConfig {
        token_url: base.join(&format!("/{provider}/token")).expect("token url"),
        api_url: base.join(&format!("/{provider}/api")).expect("api url"),
    }
}

pub fn test_config(mock: &Url) -> Config {
    let mut cfg = Config::default();
    cfg.basic.gateway_key = GATEWAY_KEY.to_string();
    cfg.basic.public_url = Url::parse(PUBLIC_URL).expect("public url");
    cfg.providers.google_ads = endpoints(mock, "google");
    cfg.providers.meta_ads = endpoints(mock, "meta");
    cfg.providers.linkedin_ads = endpoints(mock, "linkedin");
    cfg.providers.tiktok_ads = endpoints(mock, "tiktok");
    cfg
}

pub fn all_credentials() -> StaticCredentials {
    StaticCredentials::new([
        ("GOOGLE_ADS_CLIENT_ID", "google-client"),
        ("GOOGLE_ADS_CLIENT_SECRET", "google-secret"),
        ("GOOGLE_ADS_DEVELOPER_TOKEN", "google-dev-token"),
        ("META_APP_ID", "meta-app"),
        ("META_APP_SECRET", META_SECRET),
        ("LINKEDIN_CLIENT_ID", "linkedin-client"),
        ("LINKEDIN_CLIENT_SECRET", "linkedin-secret"),
        ("TIKTOK_APP_ID", "tiktok-app"),
        ("TIKTOK_APP_SECRET", "tiktok-secret"),
    ])
}

pub fn gateway(cfg: &Config, db: DbActorHandle, creds: StaticCredentials) -> Router {
    gateway_router(GatewayState::new(cfg, db, Arc::new(creds)))
}

pub async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("request failed")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

/// Query pairs of a redirect's `Location`.
pub fn location_query(resp: &Response) -> (Url, HashMap<String, String>) {
    let location = resp
        .headers()
        .get(header::LOCATION)
        .expect("missing location header")
        .to_str()
        .expect("location header was not utf-8");
    let url = Url::parse(location).expect("location was not a valid url");
    let pairs = url.query_pairs().into_owned().collect();
    (url, pairs)
}

pub async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
