//! Prometheus metrics for nonce operations.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, CounterVec};

/// Nonces issued counter.
pub static NONCES_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "nonce_guard_issued_total",
        "Total number of nonces issued",
        &["result"]
    )
    .expect("Failed to register nonces_issued metric")
});

/// Verification verdicts counter.
pub static VERIFICATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "nonce_guard_verifications_total",
        "Total number of nonce verifications",
        &["verdict"]
    )
    .expect("Failed to register verifications metric")
});

/// Referer check outcomes counter.
pub static REFERER_CHECKS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "nonce_guard_referer_checks_total",
        "Total number of referer checks",
        &["context", "verdict"]
    )
    .expect("Failed to register referer_checks metric")
});
