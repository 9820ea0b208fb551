//! Built-in HMAC token primitive.
//!
//! Tokens are truncated HMAC-SHA256 MACs over the action, the current time
//! bucket, and an optional session binding. Time is bucketed at half the
//! configured lifetime: a token verifies as current for the bucket it was
//! issued in, as previous for one further bucket, and expires after that,
//! so every token lives between half a lifetime and a full lifetime.

use super::NonceProvider;
use crate::action::{Action, Nonce};
use crate::config::ProviderConfig;
use crate::error::NonceError;
use crate::verdict::{Generation, Verification};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use ring::hmac;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Bytes of the MAC kept in the encoded token.
const TOKEN_MAC_BYTES: usize = 12;

/// HMAC-SHA256 token primitive.
pub struct HmacProvider {
    secret: Zeroizing<Vec<u8>>,
    lifetime_secs: i64,
    session_binding: Option<String>,
}

impl HmacProvider {
    /// Create a provider from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ProviderConfig) -> Result<Self, NonceError> {
        config.validate()?;
        Ok(Self {
            secret: Zeroizing::new(config.secret),
            lifetime_secs: config.lifetime.as_secs() as i64,
            session_binding: config.session_binding,
        })
    }

    /// Current time bucket.
    fn tick(&self) -> i64 {
        chrono::Utc::now().timestamp() / (self.lifetime_secs / 2)
    }

    /// Derive the token for one time bucket.
    fn token_for_tick(&self, tick: i64, action: &Action) -> String {
        let input = match &self.session_binding {
            Some(binding) => format!("{}|{}|{}", tick, action.as_str(), binding),
            None => format!("{}|{}", tick, action.as_str()),
        };

        let key = hmac::Key::new(hmac::HMAC_SHA256, &self.secret);
        let tag = hmac::sign(&key, input.as_bytes());
        URL_SAFE_NO_PAD.encode(&tag.as_ref()[..TOKEN_MAC_BYTES])
    }
}

impl NonceProvider for HmacProvider {
    fn issue(&self, action: &Action) -> Result<Nonce, NonceError> {
        Ok(Nonce::new(self.token_for_tick(self.tick(), action)))
    }

    fn verify(&self, token: &str, action: &Action) -> Verification {
        if token.is_empty() {
            return Verification::Invalid;
        }

        let tick = self.tick();
        // Both generations are derived and compared unconditionally
        let current = self.token_for_tick(tick, action);
        let previous = self.token_for_tick(tick - 1, action);
        let matches_current = bool::from(token.as_bytes().ct_eq(current.as_bytes()));
        let matches_previous = bool::from(token.as_bytes().ct_eq(previous.as_bytes()));

        if matches_current {
            Verification::Valid(Generation::Current)
        } else if matches_previous {
            Verification::Valid(Generation::Previous)
        } else {
            Verification::Invalid
        }
    }
}
