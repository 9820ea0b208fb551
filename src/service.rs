//! The nonce service.
//!
//! A [`NonceService`] is a plain value wrapping the token primitive chosen
//! at construction time. It carries no mutable state: the action scope is
//! passed explicitly into every operation (or held by a [`BoundNonce`]
//! handle), so two callers working against different actions can never
//! disturb each other. The service is deliberately neither cloneable nor
//! serializable.

use crate::action::{Action, Nonce};
use crate::config::ProviderConfig;
use crate::error::NonceError;
use crate::html;
use crate::metrics;
use crate::provider::{HmacProvider, NonceProvider};
use crate::referer::{FailureMode, RequestSnapshot};
use crate::verdict::Verification;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default query/form parameter name carrying the token.
pub const DEFAULT_TOKEN_PARAM: &str = "_token";

/// Anti-forgery nonce service.
pub struct NonceService {
    provider: Option<Arc<dyn NonceProvider>>,
}

impl NonceService {
    /// Create a service backed by the built-in [`HmacProvider`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ProviderConfig) -> Result<Self, NonceError> {
        Ok(Self {
            provider: Some(Arc::new(HmacProvider::new(config)?)),
        })
    }

    /// Create a service backed by a custom token primitive.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn NonceProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Create a service with no token primitive wired.
    ///
    /// Every producing operation fails with
    /// [`Unavailable`](NonceError::Unavailable) and every checking operation
    /// reports an [`Unavailable`](Verification::Unavailable) verdict.
    #[must_use]
    pub fn detached() -> Self {
        Self { provider: None }
    }

    /// Whether a token primitive is wired.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Issue a fresh token bound to `action`.
    ///
    /// # Errors
    ///
    /// Returns [`Unavailable`](NonceError::Unavailable) if no primitive is
    /// wired, or the provider's error if issuance fails.
    pub fn issue(&self, action: &Action) -> Result<Nonce, NonceError> {
        let Some(provider) = self.provider.as_ref() else {
            metrics::NONCES_ISSUED.with_label_values(&["unavailable"]).inc();
            return Err(NonceError::Unavailable);
        };

        let nonce = provider.issue(action)?;
        metrics::NONCES_ISSUED.with_label_values(&["ok"]).inc();
        debug!(action = %action, "issued nonce");
        Ok(nonce)
    }

    /// Verify `token` against `action`.
    ///
    /// Empty or malformed tokens are [`Invalid`](Verification::Invalid);
    /// this never panics and never returns an error.
    pub fn verify(&self, token: &str, action: &Action) -> Verification {
        let verdict = match self.provider.as_ref() {
            None => Verification::Unavailable,
            Some(_) if token.is_empty() => Verification::Invalid,
            Some(provider) => provider.verify(token, action),
        };

        metrics::VERIFICATIONS.with_label_values(&[verdict.label()]).inc();
        verdict
    }

    /// Render a hidden form field embedding a freshly issued token.
    ///
    /// `referer: Some(request_uri)` additionally emits a hidden
    /// [`_http_referer`](html::REFERER_FIELD_NAME) field carrying the
    /// current request URI.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput`](NonceError::InvalidInput) if `field_name` is
    /// empty, or [`Unavailable`](NonceError::Unavailable) if no primitive is
    /// wired.
    pub fn hidden_field(
        &self,
        action: &Action,
        field_name: &str,
        referer: Option<&str>,
    ) -> Result<String, NonceError> {
        if field_name.is_empty() {
            return Err(NonceError::invalid_input("field name must not be empty"));
        }

        let nonce = self.issue(action)?;
        Ok(html::render_hidden_field(field_name, &nonce, referer))
    }

    /// Append a freshly issued token to `url` as the `param` query
    /// parameter.
    ///
    /// Existing query parameters and any fragment are preserved.
    /// [`DEFAULT_TOKEN_PARAM`] is the conventional parameter name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput`](NonceError::InvalidInput) if `url` or
    /// `param` is empty, or [`Unavailable`](NonceError::Unavailable) if no
    /// primitive is wired.
    pub fn sign_url(&self, action: &Action, url: &str, param: &str) -> Result<String, NonceError> {
        if url.is_empty() {
            return Err(NonceError::invalid_input("url must not be empty"));
        }
        if param.is_empty() {
            return Err(NonceError::invalid_input("parameter name must not be empty"));
        }

        let nonce = self.issue(action)?;
        Ok(append_token_param(url, param, nonce.as_str()))
    }

    /// Check a privileged (admin-context) request for a valid token.
    ///
    /// Looks up `param` in the request snapshot and verifies it against
    /// `action`. Fails closed: a missing or invalid token, or an unwired
    /// primitive, yields a verdict whose `is_valid()` is false.
    pub fn check_admin_referer(
        &self,
        action: &Action,
        request: &RequestSnapshot,
        param: &str,
    ) -> Verification {
        if request.referer().is_none() {
            warn!(action = %action, "privileged request carried no referer header");
        }

        let verdict = self.check_token_param(action, request.param(param));
        metrics::REFERER_CHECKS
            .with_label_values(&["admin", verdict.label()])
            .inc();
        if !verdict.is_valid() {
            warn!(action = %action, verdict = verdict.label(), "admin referer check failed");
        }
        verdict
    }

    /// Check an asynchronous (non-privileged) request for a valid token.
    ///
    /// Looks up `param` in the request snapshot, falling back to
    /// [`DEFAULT_TOKEN_PARAM`] when absent, and verifies it against
    /// `action`. Under [`FailureMode::Halt`] a failing verdict becomes
    /// [`CheckFailed`](NonceError::CheckFailed); under
    /// [`FailureMode::Continue`] the verdict is reported either way.
    ///
    /// # Errors
    ///
    /// Returns [`CheckFailed`](NonceError::CheckFailed) when the check fails
    /// under [`FailureMode::Halt`].
    pub fn check_async_referer(
        &self,
        action: &Action,
        request: &RequestSnapshot,
        param: &str,
        on_failure: FailureMode,
    ) -> Result<Verification, NonceError> {
        let token = request
            .param(param)
            .or_else(|| request.param(DEFAULT_TOKEN_PARAM));

        let verdict = self.check_token_param(action, token);
        metrics::REFERER_CHECKS
            .with_label_values(&["async", verdict.label()])
            .inc();

        if !verdict.is_valid() {
            warn!(action = %action, verdict = verdict.label(), "async referer check failed");
            if on_failure == FailureMode::Halt {
                return Err(NonceError::CheckFailed);
            }
        }
        Ok(verdict)
    }

    /// Bind this service to one action.
    #[must_use]
    pub fn bind(&self, action: Action) -> BoundNonce<'_> {
        BoundNonce {
            service: self,
            action,
        }
    }

    fn check_token_param(&self, action: &Action, token: Option<&str>) -> Verification {
        if !self.is_available() {
            return Verification::Unavailable;
        }
        match token {
            Some(token) => self.verify(token, action),
            None => Verification::Invalid,
        }
    }
}

impl fmt::Debug for NonceService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonceService")
            .field("available", &self.is_available())
            .finish()
    }
}

/// A service bound to one action.
///
/// An immutable (service, action) pair offering the service operations
/// without the per-call action argument. Binding is per-handle: creating a
/// second handle for another action leaves this one untouched.
#[derive(Debug, Clone)]
pub struct BoundNonce<'a> {
    service: &'a NonceService,
    action: Action,
}

impl BoundNonce<'_> {
    /// The bound action.
    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Issue a fresh token for the bound action.
    ///
    /// # Errors
    ///
    /// See [`NonceService::issue`].
    pub fn issue(&self) -> Result<Nonce, NonceError> {
        self.service.issue(&self.action)
    }

    /// Verify `token` against the bound action.
    pub fn verify(&self, token: &str) -> Verification {
        self.service.verify(token, &self.action)
    }

    /// Render a hidden form field for the bound action.
    ///
    /// # Errors
    ///
    /// See [`NonceService::hidden_field`].
    pub fn hidden_field(&self, field_name: &str, referer: Option<&str>) -> Result<String, NonceError> {
        self.service.hidden_field(&self.action, field_name, referer)
    }

    /// Append a token for the bound action to `url`.
    ///
    /// # Errors
    ///
    /// See [`NonceService::sign_url`].
    pub fn sign_url(&self, url: &str, param: &str) -> Result<String, NonceError> {
        self.service.sign_url(&self.action, url, param)
    }

    /// Check a privileged request against the bound action.
    pub fn check_admin_referer(&self, request: &RequestSnapshot, param: &str) -> Verification {
        self.service.check_admin_referer(&self.action, request, param)
    }

    /// Check an asynchronous request against the bound action.
    ///
    /// # Errors
    ///
    /// See [`NonceService::check_async_referer`].
    pub fn check_async_referer(
        &self,
        request: &RequestSnapshot,
        param: &str,
        on_failure: FailureMode,
    ) -> Result<Verification, NonceError> {
        self.service
            .check_async_referer(&self.action, request, param, on_failure)
    }
}

/// Append `param=token` to a URL's query, preserving any fragment.
fn append_token_param(url: &str, param: &str, token: &str) -> String {
    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };

    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(param, token)
        .finish();

    let mut signed = String::with_capacity(url.len() + encoded.len() + 2);
    signed.push_str(base);
    if !base.contains('?') {
        signed.push('?');
    } else if !base.ends_with('?') && !base.ends_with('&') {
        signed.push('&');
    }
    signed.push_str(&encoded);

    if let Some(fragment) = fragment {
        signed.push('#');
        signed.push_str(fragment);
    }
    signed
}
