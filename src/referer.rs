//! Request snapshot and failure policy for referer checks.

use std::collections::HashMap;

/// The token-bearing parts of an incoming request.
///
/// Referer checks operate on an explicit snapshot handed in by the caller:
/// the request's query/form parameters and its `Referer` header, if any.
#[derive(Debug, Clone, Default)]
pub struct RequestSnapshot {
    params: HashMap<String, String>,
    referer: Option<String>,
}

impl RequestSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query or form parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set the `Referer` header value.
    #[must_use]
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Look up a parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The `Referer` header value, if the request carried one.
    #[must_use]
    pub fn referer(&self) -> Option<&str> {
        self.referer.as_deref()
    }
}

/// What a failed async check does.
///
/// `Halt` is the strict mode: a failed check becomes an error the caller
/// propagates, aborting the request it is handling. `Continue` reports the
/// verdict and leaves the decision to the caller. There is no default; the
/// mode is stated on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Report the verdict either way
    Continue,
    /// Turn a failed check into an error
    Halt,
}
