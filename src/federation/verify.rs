//! Verification outcomes for returning authorization responses.

use std::fmt;

/// Result of checking a returning callback against stored ceremony state.
///
/// A rejection is a negative authentication result, not a process error;
/// backing-store failures are the only condition reported as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The response came from the authorization server that was invoked.
    Verified,
    /// The response was rejected; callers deny access and surface the
    /// reason's message.
    Rejected(RejectReason),
}

impl Verification {
    #[must_use]
    pub const fn is_verified(self) -> bool {
        matches!(self, Self::Verified)
    }

    /// User-presentable message for a rejection, `None` when verified.
    #[must_use]
    pub const fn info(self) -> Option<&'static str> {
        match self {
            Self::Verified => None,
            Self::Rejected(reason) => Some(reason.message()),
        }
    }
}

/// Machine-distinguishable rejection classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No ceremony state was attached to the request.
    StateMissing,
    /// The callback's observed origin does not match the authorization server
    /// recorded at initiation (mix-up attack).
    ProviderMismatch,
}

impl RejectReason {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::StateMissing => "Unable to verify authorization request state.",
            Self::ProviderMismatch => {
                "Authorization response received from incorrect authorization server."
            }
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
