//! The ceremony state store and its verification engine.
//!
//! `store` binds a new ceremony to the authorization server it targets and
//! persists it before the redirect is issued; `verify` decides whether a
//! returning callback is legitimate and consumes the record either way. The
//! ordering inside `verify` is deliberate: the observed origin is checked
//! against the recorded provider before anything else, because a valid
//! correlation token must not rescue a response routed through the wrong
//! authorization server.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{RngCore, rngs::OsRng};
use std::sync::Arc;
use tracing::debug;

use crate::federation::{
    backing::StateBacking,
    ceremony::{Ceremony, CeremonyPayload},
    context::RequestContext,
    error::StateError,
    handle::{derive_handle, host_of},
    provider::ProviderMetadata,
    verify::{RejectReason, Verification},
};

/// Creates, persists, and consumes ceremony state across the redirect
/// round-trip.
pub struct CeremonyStore {
    backing: Arc<dyn StateBacking>,
    to_handle: Box<dyn Fn(&str, &str) -> String + Send + Sync>,
}

impl CeremonyStore {
    /// Store with the default SHA-256 handle derivation.
    #[must_use]
    pub fn new(backing: Arc<dyn StateBacking>) -> Self {
        Self::with_handle_derivation(backing, derive_handle)
    }

    /// Store with a custom `(token, host) -> handle` derivation.
    ///
    /// The derivation must be deterministic and collision-resistant per
    /// `(token, host)` pair; it is what binds a ceremony to its intended
    /// authorization server.
    pub fn with_handle_derivation<F>(backing: Arc<dyn StateBacking>, to_handle: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        Self {
            backing,
            to_handle: Box::new(to_handle),
        }
    }

    /// Persist ceremony state for an outbound authorization request.
    ///
    /// Derives the storage handle from a freshly generated correlation secret
    /// and the authorization server's host, sets the record's `location` from
    /// the provider metadata, appends it to the context, and saves. Returns
    /// the handle to send as the OAuth2 `state` parameter; the redirect must
    /// not be issued unless this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Metadata errors when the provider metadata cannot identify the
    /// authorization server or its callback URL (the store fails closed);
    /// [`StateError::Storage`] when the backing save fails, in which case the
    /// record stays appended to the context but was not durably saved.
    pub async fn store(
        &self,
        ctx: &mut RequestContext,
        payload: CeremonyPayload,
        meta: &ProviderMetadata,
    ) -> Result<String, StateError> {
        let endpoint = payload
            .provider
            .as_deref()
            .or(meta.authorization_url.as_deref())
            .ok_or(StateError::MissingAuthorizationEndpoint)?;
        let host = host_of(endpoint)
            .ok_or_else(|| StateError::EndpointWithoutHost(endpoint.to_string()))?;
        let location = meta
            .callback_url
            .clone()
            .ok_or(StateError::MissingCallbackUrl)?;

        let provider = payload.provider.clone().unwrap_or_else(|| host.clone());
        let token_secret = generate_token_secret();
        let proposed = (self.to_handle)(&token_secret, &host);

        ctx.push(Ceremony {
            provider,
            token_secret: Some(token_secret),
            location: Some(location),
            return_to: payload.return_to,
            extra: payload.extra,
        });

        let handle = self
            .backing
            .save(ctx, proposed)
            .await
            .map_err(StateError::Storage)?;

        debug!(host = %host, "Stored ceremony state");

        Ok(handle)
    }

    /// Decide whether a returning callback is legitimate.
    ///
    /// `token` is the `state` value presented by the callback; the record it
    /// addresses must already be loaded into `ctx` by the request-bound
    /// storage layer. In order: no record attached → rejected (nothing to
    /// destroy); observed host differs from the recorded provider binding →
    /// record destroyed, rejected as a mix-up; host matches → record
    /// destroyed, verified. Destruction completes before the outcome is
    /// returned, so an accepted response can never be replayed.
    ///
    /// # Errors
    ///
    /// [`StateError::Storage`] when destroying the record fails.
    pub async fn verify(
        &self,
        ctx: &mut RequestContext,
        token: &str,
    ) -> Result<Verification, StateError> {
        let matches = {
            let Some(ceremony) = ctx.ceremony() else {
                debug!(token, "No ceremony state attached to request");
                return Ok(Verification::Rejected(RejectReason::StateMissing));
            };
            match ceremony.bound_host() {
                Some(bound) => ctx
                    .observed_host()
                    .is_some_and(|observed| observed == bound.as_str()),
                None => false,
            }
        };

        // One-shot consumption: the record is gone whether the decision is
        // accept or reject, so neither outcome is retryable.
        self.backing
            .destroy(ctx)
            .await
            .map_err(StateError::Storage)?;

        if matches {
            Ok(Verification::Verified)
        } else {
            debug!(
                token,
                observed = ctx.observed_host().unwrap_or("none"),
                "Authorization response origin does not match stored provider"
            );
            Ok(Verification::Rejected(RejectReason::ProviderMismatch))
        }
    }

    /// Correlation secret of the currently-loaded record, if any.
    ///
    /// The outer authentication layer compares this against the value it
    /// carried through the round-trip; the store never interprets it.
    #[must_use]
    pub fn token_secret<'a>(&self, ctx: &'a RequestContext) -> Option<&'a str> {
        ctx.ceremony().and_then(|ceremony| ceremony.token_secret.as_deref())
    }
}

/// Fresh correlation secret for a new ceremony. The raw value only ever
/// lives inside the ceremony record; handles derived from it are what travel
/// on the wire.
fn generate_token_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}
