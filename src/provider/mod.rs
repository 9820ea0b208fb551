//! The token primitive seam.

pub mod hmac;

pub use hmac::HmacProvider;

use crate::action::{Action, Nonce};
use crate::error::NonceError;
use crate::verdict::Verification;

/// The token primitive a [`NonceService`] delegates to.
///
/// Implementations own every security-relevant decision: how a token is
/// derived, how freshness is judged, and what tolerance is applied.
/// [`HmacProvider`] is the built-in implementation; deployments with an
/// external token authority implement this trait over it instead.
///
/// [`NonceService`]: crate::service::NonceService
pub trait NonceProvider: Send + Sync {
    /// Issue a fresh token bound to `action`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot produce a token.
    fn issue(&self, action: &Action) -> Result<Nonce, NonceError>;

    /// Verify `token` against `action`.
    ///
    /// Malformed input is an [`Invalid`](Verification::Invalid) verdict,
    /// never an error.
    fn verify(&self, token: &str, action: &Action) -> Verification;
}
