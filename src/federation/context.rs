//! Request-scoped carrier of ceremony state.

use crate::federation::ceremony::Ceremony;

/// Per-request ceremony context.
///
/// Owned by the request's lifetime and passed by reference into the store and
/// the backing; never shared across requests or tasks. Records appended here
/// are pending until the backing saves them; a record loaded by the backing
/// at callback time stays attached until it is destroyed.
#[derive(Debug, Default)]
pub struct RequestContext {
    pending: Vec<Ceremony>,
    loaded: Option<(String, Ceremony)>,
    observed_host: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the host component of the callback's observed origin, used for
    /// the mix-up comparison.
    #[must_use]
    pub fn with_observed_host(mut self, host: impl Into<String>) -> Self {
        self.observed_host = Some(host.into());
        self
    }

    #[must_use]
    pub fn observed_host(&self) -> Option<&str> {
        self.observed_host.as_deref()
    }

    /// Append a record for the backing to persist on its next save.
    pub fn push(&mut self, ceremony: Ceremony) {
        self.pending.push(ceremony);
    }

    /// Records appended but not yet saved.
    #[must_use]
    pub fn pending(&self) -> &[Ceremony] {
        &self.pending
    }

    /// Hand the pending records to the backing, leaving none behind.
    pub fn take_pending(&mut self) -> Vec<Ceremony> {
        std::mem::take(&mut self.pending)
    }

    /// The currently-loaded record, if any.
    #[must_use]
    pub fn ceremony(&self) -> Option<&Ceremony> {
        self.loaded.as_ref().map(|(_, ceremony)| ceremony)
    }

    /// Handle the loaded record is addressed by.
    #[must_use]
    pub fn handle(&self) -> Option<&str> {
        self.loaded.as_ref().map(|(handle, _)| handle.as_str())
    }

    /// Attach a record retrieved from storage. Called by backings on load.
    pub fn attach(&mut self, handle: impl Into<String>, ceremony: Ceremony) {
        self.loaded = Some((handle.into(), ceremony));
    }

    /// Detach the loaded record. Called by backings on destroy; once detached
    /// the context behaves as if no state was ever present.
    pub fn detach(&mut self) -> Option<(String, Ceremony)> {
        self.loaded.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ceremony() -> Ceremony {
        Ceremony {
            provider: "https://server.example.com".to_string(),
            token_secret: Some("secret".to_string()),
            location: None,
            return_to: None,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn pending_records_are_taken_once() {
        let mut ctx = RequestContext::new();
        ctx.push(ceremony());
        assert_eq!(ctx.pending().len(), 1);

        let taken = ctx.take_pending();
        assert_eq!(taken.len(), 1);
        assert!(ctx.pending().is_empty());
    }

    #[test]
    fn attach_and_detach_loaded_record() {
        let mut ctx = RequestContext::new();
        assert!(ctx.ceremony().is_none());

        ctx.attach("xyz", ceremony());
        assert_eq!(ctx.handle(), Some("xyz"));
        assert!(ctx.ceremony().is_some());

        let (handle, _) = ctx.detach().unwrap();
        assert_eq!(handle, "xyz");
        assert!(ctx.ceremony().is_none());
        assert!(ctx.detach().is_none());
    }

    #[test]
    fn observed_host_is_carried() {
        let ctx = RequestContext::new().with_observed_host("server.example.com");
        assert_eq!(ctx.observed_host(), Some("server.example.com"));
    }
}
