//! Action scope and token value types.

use std::fmt;

/// The action a nonce is scoped to.
///
/// An `Action` names one intended operation ("delete-post", "update-profile")
/// and is passed explicitly into every issuing or checking operation. A token
/// issued for one action never verifies under another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Action(String);

impl Action {
    /// Create an action scope.
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Action(action.into())
    }

    /// The action string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An issued anti-forgery token.
///
/// Opaque to callers; validity is only decided by [`verify`] against the
/// issuing action. Carries no deserialization surface.
///
/// [`verify`]: crate::service::NonceService::verify
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce(String);

impl Nonce {
    /// Wrap a token produced by a provider.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Nonce(token.into())
    }

    /// The token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the token, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_accessors() {
        let action = Action::new("delete-post");
        assert_eq!(action.as_str(), "delete-post");
        assert_eq!(action.to_string(), "delete-post");
    }

    #[test]
    fn test_actions_compare_by_value() {
        assert_eq!(Action::new("a"), Action::new("a"));
        assert_ne!(Action::new("a"), Action::new("b"));
    }

    #[test]
    fn test_nonce_into_string() {
        let nonce = Nonce::new("abc123");
        assert_eq!(nonce.as_str(), "abc123");
        assert_eq!(nonce.into_string(), "abc123");
    }
}
