//! Error taxonomy for ceremony state management.

use thiserror::Error;

/// Fatal-for-this-ceremony failures.
///
/// Verification rejections are not errors; they are reported as
/// [`Verification::Rejected`](crate::federation::verify::Verification) so
/// callers can deny access without treating the request as a crash.
#[derive(Debug, Error)]
pub enum StateError {
    /// Neither the ceremony payload nor the provider metadata identified the
    /// authorization server. The store fails closed rather than persisting an
    /// unverifiable record.
    #[error("provider metadata is missing an authorization endpoint")]
    MissingAuthorizationEndpoint,
    /// The authorization endpoint did not contain a usable host to bind the
    /// ceremony to.
    #[error("authorization endpoint has no host: {0}")]
    EndpointWithoutHost(String),
    /// Provider metadata did not supply a redirection endpoint.
    #[error("provider metadata is missing a callback URL")]
    MissingCallbackUrl,
    /// The backing store failed to save or destroy ceremony state.
    #[error("ceremony state storage failed")]
    Storage(#[source] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn messages_name_the_failing_input() {
        assert_eq!(
            StateError::MissingAuthorizationEndpoint.to_string(),
            "provider metadata is missing an authorization endpoint"
        );
        assert_eq!(
            StateError::EndpointWithoutHost("mailto:x".to_string()).to_string(),
            "authorization endpoint has no host: mailto:x"
        );
        assert_eq!(
            StateError::MissingCallbackUrl.to_string(),
            "provider metadata is missing a callback URL"
        );
    }

    #[test]
    fn storage_error_keeps_its_source() {
        let err = StateError::Storage(anyhow!("something went wrong"));
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "something went wrong");
    }
}
