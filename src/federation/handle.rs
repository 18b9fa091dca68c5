//! Handle derivation: binding a ceremony to its intended authorization server.

use base64ct::{Base64UrlUnpadded, Encoding};
use sha2::{Digest, Sha256};
use url::Url;

/// Default `(token, host) -> handle` derivation: SHA-256 over the correlation
/// token secret and the authorization server host, base64url encoded.
///
/// The derivation is what makes the stored state addressable only by the
/// `(token, host)` pair it was created for; a response routed through a
/// different server cannot resolve to the same handle.
#[must_use]
pub fn derive_handle(token: &str, host: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.update(b".");
    hasher.update(host.as_bytes());
    Base64UrlUnpadded::encode_string(hasher.finalize().as_slice())
}

/// Host component of a provider identifier or endpoint URI.
///
/// Opaque, non-URL identifiers are taken as the host verbatim; absolute URLs
/// without a host (`mailto:`, `data:`) yield `None`.
#[must_use]
pub fn host_of(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    match Url::parse(value) {
        Ok(url) => url.host_str().map(ToString::to_string),
        Err(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let first = derive_handle("token", "server.example.com");
        let second = derive_handle("token", "server.example.com");
        assert_eq!(first, second);
    }

    #[test]
    fn derivation_is_sensitive_to_token_and_host() {
        let base = derive_handle("token", "server.example.com");
        assert_ne!(base, derive_handle("other", "server.example.com"));
        assert_ne!(base, derive_handle("token", "server.example.net"));
    }

    #[test]
    fn derivation_does_not_collide_on_boundary_shifts() {
        // "ab" + "c.example" vs "a" + "bc.example" must hash differently.
        assert_ne!(derive_handle("ab", "c.example"), derive_handle("a", "bc.example"));
    }

    #[test]
    fn handles_are_url_safe() {
        let handle = derive_handle("token", "server.example.com");
        assert!(!handle.contains('+'));
        assert!(!handle.contains('/'));
        assert!(!handle.contains('='));
    }

    #[test]
    fn host_of_parses_urls_and_passes_bare_hosts() {
        assert_eq!(
            host_of("https://server.example.com/authorize"),
            Some("server.example.com".to_string())
        );
        assert_eq!(
            host_of("server.example.com"),
            Some("server.example.com".to_string())
        );
        assert_eq!(host_of("mailto:idp@example.com"), None);
        assert_eq!(host_of(""), None);
    }
}
