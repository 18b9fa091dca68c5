//! Federation initiation endpoint.
//!
//! Persists ceremony state for the chosen provider and redirects the user
//! agent to its authorization endpoint. The redirect is only issued once the
//! state is durably saved; a storage failure is an initiation failure.

use anyhow::{Context, Result};
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};
use url::Url;

use crate::api::AppState;
use crate::federation::{CeremonyPayload, ProviderMetadata, RequestContext};

/// Query parameters with ceremony-level meaning; everything else is carried
/// into the record's opaque extension map.
const RESERVED_PARAMS: &[&str] = &["provider", "protocol", "return_to"];

#[utoipa::path(
    get,
    path = "/federate",
    params(
        ("provider" = String, Query, description = "Authorization server to federate with"),
        ("return_to" = Option<String>, Query, description = "Post-authentication destination"),
    ),
    responses(
        (status = 303, description = "Redirect to the provider's authorization endpoint"),
        (status = 400, description = "Missing provider"),
        (status = 404, description = "Unknown provider"),
        (status = 500, description = "Ceremony initiation failed"),
    ),
    tag = "federation"
)]
pub async fn federate(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let Some(provider) = params.get("provider").cloned() else {
        return (StatusCode::BAD_REQUEST, "Missing provider".to_string()).into_response();
    };

    let meta = match state.resolver().resolve(&provider).await {
        Ok(Some(meta)) => meta,
        Ok(None) => {
            debug!(provider, "Unknown provider requested");
            return (StatusCode::NOT_FOUND, "Unknown provider".to_string()).into_response();
        }
        Err(err) => {
            error!("Failed to resolve provider: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut ctx = RequestContext::new();
    let handle = match state
        .store()
        .store(&mut ctx, build_payload(&provider, &params), &meta)
        .await
    {
        Ok(handle) => handle,
        Err(err) => {
            error!("Failed to persist ceremony state: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match authorization_redirect(&meta, &handle) {
        Ok(url) => Redirect::to(url.as_str()).into_response(),
        Err(err) => {
            error!("Failed to build authorization redirect: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Split the query string into reserved ceremony fields and opaque
/// extensions.
fn build_payload(provider: &str, params: &HashMap<String, String>) -> CeremonyPayload {
    let mut payload = CeremonyPayload::new().with_provider(provider);
    if let Some(return_to) = params.get("return_to") {
        payload = payload.with_return_to(return_to.as_str());
    }
    for (key, value) in params {
        if RESERVED_PARAMS.contains(&key.as_str()) {
            continue;
        }
        payload
            .extra
            .insert(key.clone(), Value::String(value.clone()));
    }
    payload
}

/// Authorization request URI for the provider, carrying the ceremony handle
/// as the `state` parameter.
fn authorization_redirect(meta: &ProviderMetadata, handle: &str) -> Result<Url> {
    let endpoint = meta
        .authorization_url
        .as_deref()
        .context("provider metadata is missing an authorization endpoint")?;
    let mut url = Url::parse(endpoint).context("invalid authorization endpoint")?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("response_type", "code");
        if let Some(client_id) = &meta.client_id {
            query.append_pair("client_id", client_id);
        }
        if let Some(callback) = &meta.callback_url {
            query.append_pair("redirect_uri", callback);
        }
        query.append_pair("state", handle);
    }
    Ok(url)
}
