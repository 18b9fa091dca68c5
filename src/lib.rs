//! # Federado (Federated Authentication Ceremony Authority)
//!
//! `federado` carries per-request ceremony state across the untrusted,
//! stateless redirect round-trip of OAuth2-style authorization-code flows,
//! and validates on return that the response came from the authorization
//! server that was actually invoked.
//!
//! ## Ceremony model
//!
//! Exactly one live ceremony record exists per in-flight federation attempt,
//! addressed by a single correlation handle carried as the OAuth2 `state`
//! parameter.
//!
//! - **One-shot consumption:** a record is destroyed on the first
//!   verification decision, accepted or rejected, and is never reusable.
//! - **Mix-up defense first:** the callback's observed origin is checked
//!   against the provider recorded at initiation before anything else; a
//!   valid correlation token never rescues a response routed through the
//!   wrong authorization server.
//! - **Fail closed:** incomplete provider metadata yields no handle and no
//!   redirect.
//!
//! ## Boundaries
//!
//! Identity-provider resolution, token exchange, profile fetching, and
//! session establishment live behind the resolver and backing-store traits;
//! the core only consumes what they produce.

pub mod api;
pub mod cli;
pub mod federation;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
