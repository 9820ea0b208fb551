//! Error types for nonce operations.

use thiserror::Error;

/// Errors from nonce operations.
#[derive(Error, Debug)]
pub enum NonceError {
    /// No nonce provider is wired into the service
    #[error("Nonce provider unavailable")]
    Unavailable,

    /// Invalid input to a guarded operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A request check failed under halting failure mode
    #[error("Request check failed")]
    CheckFailed,

    /// Invalid provider configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl NonceError {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        NonceError::InvalidInput(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        NonceError::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NonceError::invalid_input("url must not be empty");
        assert_eq!(err.to_string(), "Invalid input: url must not be empty");
        assert_eq!(NonceError::Unavailable.to_string(), "Nonce provider unavailable");
    }
}
