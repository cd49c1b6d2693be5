//! Provider authorization callback.
//!
//! Always answers with a redirect to the application's result page. Outcome travels as query
//! parameters: `provider`, `status=connected` and `account` on success, `error` and
//! `error_description` otherwise.

use crate::db::IntegrationUpsert;
use crate::error::ConnectError;
use crate::exchange::exchange;
use crate::identity::{AccountIdentity, LookupContext, resolve_identity};
use crate::providers::ProviderKind;
use crate::server::router::GatewayState;
use crate::state_token::StateToken;
use axum::{
    Router,
    extract::{Query, State},
    response::Redirect,
    routing::get,
};
use chrono::Utc;
use oauth2::{AuthorizationCode, RedirectUrl};
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

pub const CALLBACK_PATH: &str = "/oauth/callback";

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

pub fn router() -> Router<GatewayState> {
    Router::new().route(CALLBACK_PATH, get(oauth_callback))
}

/// `<public_url>/oauth/callback`, the `redirect_uri` registered with every provider.
pub fn callback_url(public_url: &Url) -> Url {
    join_path(public_url, CALLBACK_PATH)
}

fn join_path(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let base_path = url.path().trim_end_matches('/').to_string();
    let path = path.trim_start_matches('/');
    url.set_path(&format!("{base_path}/{path}"));
    url.set_query(None);
    url
}

fn result_url(state: &GatewayState, pairs: &[(&str, &str)]) -> Url {
    let mut url = join_path(&state.public_url, &state.result_path);
    url.query_pairs_mut().extend_pairs(pairs);
    url
}

/// GET /oauth/callback
pub async fn oauth_callback(
    State(state): State<GatewayState>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    let target = match connect(&state, query).await {
        Ok((kind, identity)) => result_url(
            &state,
            &[
                ("provider", kind.as_str()),
                ("status", "connected"),
                ("account", identity.name.as_str()),
            ],
        ),
        Err(err) => {
            warn!(category = err.category(), error = %err, "Connect callback failed");
            result_url(
                &state,
                &[
                    ("error", err.category()),
                    ("error_description", err.description().as_str()),
                ],
            )
        }
    };
    Redirect::temporary(target.as_str())
}

async fn connect(
    state: &GatewayState,
    query: CallbackQuery,
) -> Result<(ProviderKind, AccountIdentity), ConnectError> {
    if let Some(error) = query.error.filter(|e| !e.trim().is_empty()) {
        let text = query
            .error_description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(error);
        return Err(ConnectError::ProviderDeclined(text));
    }

    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(code), Some(raw_state)) = (non_empty(query.code), non_empty(query.state)) else {
        return Err(ConnectError::MissingParams);
    };

    // Rejected before any network call.
    let token_state = StateToken::decode(&raw_state)?;
    token_state.check_fresh(Utc::now(), state.state_ttl)?;

    let adapter = state
        .registry
        .resolve(&token_state.provider)
        .ok_or_else(|| ConnectError::UnknownProvider(token_state.provider.clone()))?;
    let kind = adapter.kind();

    let redirect_uri = RedirectUrl::from_url(callback_url(&state.public_url));
    let token = exchange(
        &state.client,
        state.credentials.as_ref(),
        adapter.as_ref(),
        &AuthorizationCode::new(code),
        &redirect_uri,
    )
    .await
    .map_err(|e| ConnectError::from_exchange(kind, e))?;

    let identity = resolve_identity(
        adapter.as_ref(),
        &LookupContext {
            http: &state.client,
            access_token: &token.access_token,
            credentials: state.credentials.as_ref(),
        },
    )
    .await;

    let upsert = IntegrationUpsert {
        user_id: token_state.user_id.clone(),
        provider: kind,
        access_token: token.access_token.secret().clone(),
        refresh_token: token.refresh_token.as_ref().map(|t| t.secret().clone()),
        token_expires_at: token.expires_at(Utc::now()),
        account_id: identity.id.clone(),
        account_name: identity.name.clone(),
        account_currency: identity.currency.clone(),
    };
    let id = state
        .db
        .upsert_integration(upsert)
        .await
        .map_err(|e| ConnectError::Db(e.to_string()))?;

    info!(
        provider = %kind,
        user_id = %token_state.user_id,
        integration_id = id,
        account_id = %identity.id,
        placeholder_identity = identity.is_sentinel(),
        "Integration connected"
    );
    Ok((kind, identity))
}
