//! Request-bound storage backends for ceremony state.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::federation::{ceremony::Ceremony, context::RequestContext};

/// Storage a ceremony store delegates persistence to.
///
/// Implementations own durability and expiry (session, cache, datastore).
/// The store issues at most one `save` per initiation and one `destroy` per
/// verification and never retries; each handle is single-use by construction,
/// so implementations never see read-modify-write races on the same handle.
#[async_trait]
pub trait StateBacking: Send + Sync {
    /// Hydrate the context with the record addressed by `handle`, if one
    /// exists. An unknown handle is not an error; the context simply stays
    /// empty and verification reports the missing state.
    async fn load(&self, ctx: &mut RequestContext, handle: &str) -> Result<()>;

    /// Persist the context's pending records under `proposed`, returning the
    /// final handle. The returned value is what the caller must place in the
    /// OAuth2 `state` parameter; implementations may adopt the proposed
    /// handle or substitute their own.
    async fn save(&self, ctx: &mut RequestContext, proposed: String) -> Result<String>;

    /// Remove the currently-loaded record and clear it from the context.
    async fn destroy(&self, ctx: &mut RequestContext) -> Result<()>;
}

/// In-memory backing, for single-process deployments and tests.
///
/// Abandoned ceremonies stay until process exit; bounded retention is a
/// deployment concern for session- or cache-backed implementations.
#[derive(Debug, Default)]
pub struct MemoryBacking {
    records: Mutex<HashMap<String, Ceremony>>,
}

impl MemoryBacking {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record is currently stored under `handle`.
    pub async fn contains(&self, handle: &str) -> bool {
        self.records.lock().await.contains_key(handle)
    }
}

#[async_trait]
impl StateBacking for MemoryBacking {
    async fn load(&self, ctx: &mut RequestContext, handle: &str) -> Result<()> {
        let records = self.records.lock().await;
        if let Some(record) = records.get(handle) {
            ctx.attach(handle, record.clone());
        }
        Ok(())
    }

    async fn save(&self, ctx: &mut RequestContext, proposed: String) -> Result<String> {
        // One ceremony per request; the last appended record wins.
        let record = ctx
            .take_pending()
            .pop()
            .ok_or_else(|| anyhow!("no ceremony state pending save"))?;
        self.records.lock().await.insert(proposed.clone(), record);
        Ok(proposed)
    }

    async fn destroy(&self, ctx: &mut RequestContext) -> Result<()> {
        let Some((handle, _)) = ctx.detach() else {
            return Ok(());
        };
        self.records.lock().await.remove(&handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ceremony() -> Ceremony {
        Ceremony {
            provider: "https://server.example.com".to_string(),
            token_secret: Some("secret".to_string()),
            location: Some("https://client.example.com/cb".to_string()),
            return_to: None,
            extra: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn save_persists_the_pending_record() {
        let backing = MemoryBacking::new();
        let mut ctx = RequestContext::new();
        ctx.push(ceremony());

        let handle = backing.save(&mut ctx, "xyz".to_string()).await.unwrap();
        assert_eq!(handle, "xyz");
        assert!(ctx.pending().is_empty());
        assert!(backing.contains("xyz").await);
    }

    #[tokio::test]
    async fn save_without_pending_record_fails() {
        let backing = MemoryBacking::new();
        let mut ctx = RequestContext::new();
        let err = backing.save(&mut ctx, "xyz".to_string()).await.unwrap_err();
        assert_eq!(err.to_string(), "no ceremony state pending save");
    }

    #[tokio::test]
    async fn load_attaches_known_handles_only() {
        let backing = MemoryBacking::new();
        let mut ctx = RequestContext::new();
        ctx.push(ceremony());
        backing.save(&mut ctx, "xyz".to_string()).await.unwrap();

        let mut callback_ctx = RequestContext::new();
        backing.load(&mut callback_ctx, "xyz").await.unwrap();
        assert_eq!(callback_ctx.handle(), Some("xyz"));

        let mut unknown_ctx = RequestContext::new();
        backing.load(&mut unknown_ctx, "nope").await.unwrap();
        assert!(unknown_ctx.ceremony().is_none());
    }

    #[tokio::test]
    async fn destroy_removes_the_loaded_record() {
        let backing = MemoryBacking::new();
        let mut ctx = RequestContext::new();
        ctx.push(ceremony());
        backing.save(&mut ctx, "xyz".to_string()).await.unwrap();

        let mut callback_ctx = RequestContext::new();
        backing.load(&mut callback_ctx, "xyz").await.unwrap();
        backing.destroy(&mut callback_ctx).await.unwrap();

        assert!(callback_ctx.ceremony().is_none());
        assert!(!backing.contains("xyz").await);
    }

    #[tokio::test]
    async fn destroy_without_loaded_record_is_a_noop() {
        let backing = MemoryBacking::new();
        let mut ctx = RequestContext::new();
        backing.destroy(&mut ctx).await.unwrap();
    }
}
