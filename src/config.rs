//! Configuration for the built-in nonce provider.
//!
//! Configuration is loaded from environment variables and validated before
//! the provider is constructed.

use crate::error::NonceError;
use std::env;
use std::time::Duration;

/// Default token lifetime: 24 hours.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(86_400);

/// Minimum secret key length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Built-in provider configuration.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Secret key the token MAC is derived from (at least 32 bytes)
    pub secret: Vec<u8>,
    /// Token lifetime; a token stays verifiable for at most this long
    pub lifetime: Duration,
    /// Opaque session or user identifier mixed into the MAC, so tokens do
    /// not transfer across sessions
    pub session_binding: Option<String>,
}

impl ProviderConfig {
    /// Create a configuration with the given secret and default lifetime.
    #[must_use]
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            lifetime: DEFAULT_LIFETIME,
            session_binding: None,
        }
    }

    /// Set the token lifetime.
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Set the session binding.
    #[must_use]
    pub fn with_session_binding(mut self, binding: impl Into<String>) -> Self {
        self.session_binding = Some(binding.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `NONCE_SECRET` (base64), `NONCE_LIFETIME` (seconds) and
    /// `NONCE_SESSION_BINDING`. A missing secret generates a random
    /// development key, which makes issued tokens worthless across restarts.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid, or if the
    /// resulting configuration fails validation.
    pub fn from_env() -> Result<Self, NonceError> {
        dotenvy::dotenv().ok();

        let secret = match env::var("NONCE_SECRET") {
            Ok(encoded) => base64::Engine::decode(
                &base64::engine::general_purpose::STANDARD,
                &encoded,
            )
            .map_err(|e| NonceError::config(format!("Invalid NONCE_SECRET: {}", e)))?,
            Err(_) => {
                tracing::warn!("NONCE_SECRET not set - generating a random development secret");
                generate_secret()
            }
        };

        let lifetime = Duration::from_secs(parse_env("NONCE_LIFETIME", 86_400)?);
        let session_binding = env::var("NONCE_SESSION_BINDING").ok();

        let config = Self {
            secret,
            lifetime,
            session_binding,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is too short or the lifetime too small
    /// to bucket.
    pub fn validate(&self) -> Result<(), NonceError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(NonceError::config(format!(
                "Secret must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                self.secret.len()
            )));
        }
        if self.lifetime.as_secs() < 2 {
            return Err(NonceError::config(format!(
                "Lifetime must be at least 2 seconds, got {}",
                self.lifetime.as_secs()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret
        f.debug_struct("ProviderConfig")
            .field("secret", &format_args!("[{} bytes]", self.secret.len()))
            .field("lifetime", &self.lifetime)
            .field("session_binding", &self.session_binding)
            .finish()
    }
}

/// Generate a random secret key.
fn generate_secret() -> Vec<u8> {
    use rand::RngCore;
    let mut key = vec![0u8; MIN_SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut key);
    key
}

/// Parse environment variable with default value.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, NonceError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| NonceError::config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::new(vec![7u8; 32]);
        assert_eq!(config.lifetime, DEFAULT_LIFETIME);
        assert!(config.session_binding.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = ProviderConfig::new(vec![7u8; 16]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tiny_lifetime_rejected() {
        let config = ProviderConfig::new(vec![7u8; 32]).with_lifetime(Duration::from_secs(1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_setters() {
        let config = ProviderConfig::new(vec![7u8; 32])
            .with_lifetime(Duration::from_secs(600))
            .with_session_binding("session-9");
        assert_eq!(config.lifetime.as_secs(), 600);
        assert_eq!(config.session_binding.as_deref(), Some("session-9"));
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = ProviderConfig::new(vec![7u8; 32]);
        let printed = format!("{:?}", config);
        assert!(printed.contains("[32 bytes]"));
        assert!(!printed.contains("7, 7"));
    }

    #[test]
    fn test_from_env_defaults() {
        env::remove_var("NONCE_SECRET");
        env::remove_var("NONCE_LIFETIME");
        env::remove_var("NONCE_SESSION_BINDING");

        let config = ProviderConfig::from_env().unwrap();

        assert_eq!(config.secret.len(), MIN_SECRET_LEN);
        assert_eq!(config.lifetime, DEFAULT_LIFETIME);
        assert!(config.session_binding.is_none());
    }
}
