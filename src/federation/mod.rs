//! Ceremony state for redirect-based federated authentication.
//!
//! A ceremony is one complete initiate → redirect → callback round-trip of a
//! federated authentication attempt. The state carried across that round-trip
//! is the only defense against two attacks:
//!
//! - **CSRF**: an attacker supplying their own authorization code to bind to
//!   a victim's session. Defended by the correlation secret generated at
//!   initiation and bound into the storage handle.
//! - **Mix-up**: an attacker routing a response from a malicious or wrong
//!   authorization server to spoof identity at a trusted one. Defended by
//!   recording which server was invoked and checking the callback's observed
//!   origin against it, independently of the correlation token.

pub mod backing;
pub mod ceremony;
pub mod context;
pub mod error;
pub mod handle;
pub mod provider;
pub mod store;
pub mod verify;

pub use backing::{MemoryBacking, StateBacking};
pub use ceremony::{Ceremony, CeremonyPayload};
pub use context::RequestContext;
pub use error::StateError;
pub use provider::{IdpResolver, ProviderMetadata, StaticResolver};
pub use store::CeremonyStore;
pub use verify::{RejectReason, Verification};
