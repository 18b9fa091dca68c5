//! Authorization response (callback) endpoint.
//!
//! The `hostname` path parameter is the observed origin used for the mix-up
//! comparison against the stored provider binding. Verification consumes the
//! ceremony record whether the outcome is accept or reject.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::api::AppState;
use crate::federation::{RequestContext, Verification};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code, handed off to the token-exchange layer.
    pub code: Option<String>,
    /// Ceremony handle issued at initiation.
    pub state: Option<String>,
    /// Error code reported by the authorization server.
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[utoipa::path(
    get,
    path = "/callback/{hostname}",
    params(
        ("hostname" = String, Path, description = "Observed authorization server host"),
        ("code" = Option<String>, Query, description = "Authorization code"),
        ("state" = Option<String>, Query, description = "Ceremony handle"),
        ("error" = Option<String>, Query, description = "Provider-reported error code"),
    ),
    responses(
        (status = 303, description = "Ceremony verified; redirect to the stored destination"),
        (status = 400, description = "Missing state parameter"),
        (status = 403, description = "Verification rejected or provider-reported error"),
        (status = 500, description = "Ceremony state storage failed"),
    ),
    tag = "federation"
)]
pub async fn callback(
    Extension(state): Extension<Arc<AppState>>,
    Path(hostname): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    if let Some(error_code) = &query.error {
        warn!(
            error = %error_code,
            description = query.error_description.as_deref().unwrap_or(""),
            "Authorization server reported an error"
        );
        return (StatusCode::FORBIDDEN, "Authorization failed".to_string()).into_response();
    }

    let Some(token) = query.state else {
        return (StatusCode::BAD_REQUEST, "Missing state".to_string()).into_response();
    };

    let mut ctx = RequestContext::new().with_observed_host(hostname);
    if let Err(err) = state.backing().load(&mut ctx, &token).await {
        error!("Failed to load ceremony state: {err}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    // Capture the destination before verification consumes the record.
    let return_to = ctx
        .ceremony()
        .and_then(|ceremony| ceremony.return_to.clone());

    match state.store().verify(&mut ctx, &token).await {
        Ok(Verification::Verified) => {
            debug!(code = query.code.is_some(), "Ceremony verified");
            let destination = return_to
                .as_deref()
                .and_then(sanitize_return_to)
                .unwrap_or("/");
            Redirect::to(destination).into_response()
        }
        Ok(Verification::Rejected(reason)) => {
            warn!(%reason, "Rejected authorization response");
            (StatusCode::FORBIDDEN, reason.message().to_string()).into_response()
        }
        Err(err) => {
            error!("Failed to verify ceremony state: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Only follow relative destinations; anything that could leave the site
/// falls back to the application root.
fn sanitize_return_to(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.starts_with('/') {
        return None;
    }
    if trimmed.starts_with("//") || trimmed.starts_with("/\\") || trimmed.contains("://") {
        return None;
    }
    Some(trimmed)
}
