//! Identity-provider metadata and the resolver boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the store needs to know about an authorization server.
///
/// Supplied by an identity-provider resolver. Fields are optional because
/// resolvers may hold partial configuration; the store fails closed on
/// whatever it depends on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Authorization endpoint the user agent is redirected to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    /// Token endpoint, carried for the token-exchange layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    /// OAuth2 client identifier registered with the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Redirection endpoint the provider calls back on; stored as the
    /// ceremony record's `location`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

/// Resolves a provider identifier to its metadata.
///
/// Provider configuration (multi-tenancy, discovery, secrets) lives behind
/// this boundary; the ceremony store only consumes the resolved metadata.
#[async_trait]
pub trait IdpResolver: Send + Sync {
    /// Metadata for `provider`, or `None` when the provider is unknown.
    async fn resolve(&self, provider: &str) -> anyhow::Result<Option<ProviderMetadata>>;
}

/// Resolver backed by a fixed registry, typically deserialized from a JSON
/// file keyed by provider identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticResolver {
    providers: HashMap<String, ProviderMetadata>,
}

impl StaticResolver {
    #[must_use]
    pub fn new(providers: HashMap<String, ProviderMetadata>) -> Self {
        Self { providers }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl IdpResolver for StaticResolver {
    async fn resolve(&self, provider: &str) -> anyhow::Result<Option<ProviderMetadata>> {
        Ok(self.providers.get(provider).cloned())
    }
}
