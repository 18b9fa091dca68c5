//! The ceremony record carried across the redirect round-trip.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::federation::handle::host_of;

/// State persisted for one in-flight federation attempt.
///
/// `provider` and `location` are fixed at store time and are the values the
/// verification engine checks on the way back; neither is ever derived from
/// the callback request itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ceremony {
    /// Authorization server the ceremony was initiated against.
    pub provider: String,
    /// Correlation secret binding the outbound request to the callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_secret: Option<String>,
    /// Redirection endpoint the provider is expected to call back on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Where to send the user agent once the ceremony completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
    /// Initiator-supplied ceremony fields, carried opaquely.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Ceremony {
    /// Host this ceremony is bound to, used for the mix-up comparison.
    ///
    /// Falls back to the raw provider value when it is not a parseable URL
    /// (opaque, host-like provider identifiers).
    #[must_use]
    pub fn bound_host(&self) -> Option<String> {
        host_of(&self.provider)
    }
}

/// Initiator-supplied input for a new ceremony.
///
/// Reserved fields are named; everything else rides in `extra` and is carried
/// through storage untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CeremonyPayload {
    /// Authorization server to federate with. When absent, the provider is
    /// inferred from the metadata's authorization endpoint host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Post-authentication destination for the user agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
    /// Opaque ceremony-scoped extension fields.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl CeremonyPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    #[must_use]
    pub fn with_return_to(mut self, return_to: impl Into<String>) -> Self {
        self.return_to = Some(return_to.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ceremony(provider: &str) -> Ceremony {
        Ceremony {
            provider: provider.to_string(),
            token_secret: None,
            location: None,
            return_to: None,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn bound_host_from_provider_url() {
        assert_eq!(
            ceremony("https://server.example.com").bound_host(),
            Some("server.example.com".to_string())
        );
    }

    #[test]
    fn bound_host_from_opaque_provider() {
        assert_eq!(
            ceremony("server.example.com").bound_host(),
            Some("server.example.com".to_string())
        );
    }

    #[test]
    fn bound_host_missing_for_hostless_url() {
        assert_eq!(ceremony("mailto:idp@example.com").bound_host(), None);
    }

    #[test]
    fn extension_fields_flatten_through_serde() {
        let mut extra = HashMap::new();
        extra.insert("display".to_string(), json!("page"));
        let record = Ceremony {
            provider: "https://server.example.com".to_string(),
            token_secret: Some("secret".to_string()),
            location: Some("https://client.example.com/cb".to_string()),
            return_to: Some("/home".to_string()),
            extra,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["provider"], "https://server.example.com");
        assert_eq!(value["display"], "page");

        let round: Ceremony = serde_json::from_value(value).unwrap();
        assert_eq!(round, record);
    }

    #[test]
    fn payload_builders_set_reserved_fields() {
        let payload = CeremonyPayload::new()
            .with_provider("https://server.example.com")
            .with_return_to("/home");
        assert_eq!(
            payload.provider.as_deref(),
            Some("https://server.example.com")
        );
        assert_eq!(payload.return_to.as_deref(), Some("/home"));
        assert!(payload.extra.is_empty());
    }
}
