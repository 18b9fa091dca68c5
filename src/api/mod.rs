//! HTTP surface: application state, router construction, and server wiring.

use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;

pub mod handlers;
mod openapi;

pub use openapi::ApiDoc;

use crate::federation::{CeremonyStore, IdpResolver, StateBacking};

/// Shared service state: the ceremony store, its backing, and the provider
/// resolver.
pub struct AppState {
    store: CeremonyStore,
    backing: Arc<dyn StateBacking>,
    resolver: Arc<dyn IdpResolver>,
}

impl AppState {
    #[must_use]
    pub fn new(backing: Arc<dyn StateBacking>, resolver: Arc<dyn IdpResolver>) -> Self {
        Self {
            store: CeremonyStore::new(backing.clone()),
            backing,
            resolver,
        }
    }

    #[must_use]
    pub fn store(&self) -> &CeremonyStore {
        &self.store
    }

    #[must_use]
    pub fn backing(&self) -> &dyn StateBacking {
        self.backing.as_ref()
    }

    #[must_use]
    pub fn resolver(&self) -> &dyn IdpResolver {
        self.resolver.as_ref()
    }
}

/// Build the router with tracing and request-id middleware applied.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/federate", get(handlers::federate))
        .route("/callback/:hostname", get(handlers::callback))
        .route("/openapi.json", get(openapi::openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: Arc<AppState>) -> Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
