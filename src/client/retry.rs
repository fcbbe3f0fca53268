//! Retry policy for transient transport failures.
//!
//! Transport errors are classified into a [`FailureType`]. Only transient
//! and rate-limited failures reach the retry layer (as
//! [`ClientError::RequestRetry`]); everything else is surfaced unchanged.
//!
//! A [`RetryBudget`] is created once per externally initiated call and
//! threaded through every dispatch of that call, including the re-dispatch
//! after a login handshake, so an internal re-dispatch never gets a fresh
//! budget.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, instrument, warn};

use super::error::{ClientError, TransportError};
use super::pipeline::Dispatch;
use super::request::{RawResponse, RequestSpec};

/// Default retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay when backoff is enabled (1 second).
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default maximum delay cap (32 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(32);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Maximum jitter added to delays (500ms).
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Classification of transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry.
    ///
    /// Examples: network timeout, 5xx server errors, connection refused.
    Transient,

    /// Failure that won't succeed regardless of retries.
    ///
    /// Examples: 404 Not Found, TLS errors, client build failures.
    Permanent,

    /// Server rate limiting (HTTP 429); retried like a transient failure.
    RateLimited,
}

impl FailureType {
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient | Self::RateLimited)
    }
}

/// Exponential backoff between retries.
///
/// ```text
/// delay = min(base_delay * multiplier^(retry - 1), max_delay) + jitter
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl Backoff {
    /// Backoff starting at `base_delay` with default cap and multiplier.
    #[must_use]
    pub fn from_base(base_delay: Duration) -> Self {
        Self {
            base_delay,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-indexed), without jitter.
    #[must_use]
    pub fn base_delay_for(&self, retry: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let exponent = f64::from(retry.saturating_sub(1));
        let delay_ms = base_ms * f64::from(self.multiplier).powf(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped_ms as u64)
    }
}

/// Retry configuration.
///
/// `max_retries` counts retries, so one call makes at most
/// `max_retries + 1` transport calls. Without backoff, retries are
/// immediate.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Option<Backoff>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: None,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff: Option<Backoff>) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Immediate retries up to `max_retries`.
    #[must_use]
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    #[must_use]
    pub fn backoff(&self) -> Option<Backoff> {
        self.backoff
    }

    /// A fresh budget for one externally initiated call.
    #[must_use]
    pub fn budget(&self) -> RetryBudget {
        RetryBudget::new(self.max_retries)
    }

    /// Delay before retry number `retry` (1-indexed).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self.backoff {
            Some(backoff) => backoff.base_delay_for(retry) + calculate_jitter(),
            None => Duration::ZERO,
        }
    }
}

/// Generates random jitter between 0 and `MAX_JITTER`.
fn calculate_jitter() -> Duration {
    let mut rng = rand::thread_rng();
    let max_ms = u64::try_from(MAX_JITTER.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(rng.gen_range(0..=max_ms))
}

/// Remaining retries and attempts made during one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
    attempts: u32,
}

impl RetryBudget {
    #[must_use]
    pub fn new(retries: u32) -> Self {
        Self {
            remaining: retries,
            attempts: 0,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Transport attempts made so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Retries already spent.
    #[must_use]
    pub fn retries_used(&self, policy: &RetryPolicy) -> u32 {
        policy.max_retries().saturating_sub(self.remaining)
    }

    fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Takes one retry; false when none are left.
    fn take_retry(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Retry layer of the pipeline.
#[derive(Debug)]
pub struct Retrying<D> {
    inner: D,
    policy: RetryPolicy,
}

impl<D> Retrying<D> {
    #[must_use]
    pub fn new(inner: D, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    #[must_use]
    pub fn inner(&self) -> &D {
        &self.inner
    }
}

#[async_trait]
impl<D: Dispatch> Dispatch for Retrying<D> {
    #[instrument(level = "debug", skip(self, request, budget), fields(request = %request))]
    async fn dispatch(
        &self,
        request: &RequestSpec,
        budget: &mut RetryBudget,
    ) -> Result<RawResponse, ClientError> {
        loop {
            budget.record_attempt();
            match self.inner.dispatch(request, budget).await {
                Err(ClientError::RequestRetry(source)) => {
                    if !budget.take_retry() {
                        warn!(attempts = budget.attempts(), error = %source, "retries exhausted");
                        return Err(ClientError::RetryExhausted {
                            attempts: budget.attempts(),
                            source,
                        });
                    }
                    let retry = budget.retries_used(&self.policy);
                    let delay = self.policy.delay_for(retry);
                    warn!(
                        retry,
                        remaining = budget.remaining(),
                        delay_ms = delay.as_millis(),
                        error = %source,
                        "transient failure, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                other => return other,
            }
        }
    }
}

/// Classifies a transport error for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | Timeout | Transient |
/// | Network (most) | Transient |
/// | Network (TLS) | Permanent |
/// | Body read | Transient |
/// | HTTP status | see [`classify_http_status`] |
/// | Client build | Permanent |
#[instrument(level = "debug")]
pub fn classify_error(error: &TransportError) -> FailureType {
    let failure = match error {
        TransportError::HttpStatus { status, .. } => classify_http_status(*status),
        TransportError::Timeout { .. } | TransportError::Body { .. } => FailureType::Transient,
        TransportError::Network { source, .. } => {
            if is_tls_error(source) {
                FailureType::Permanent
            } else {
                FailureType::Transient
            }
        }
        TransportError::Build(_) => FailureType::Permanent,
    };
    debug!(?failure, "classified transport failure");
    failure
}

/// Classifies an HTTP status code into a failure type.
///
/// Explicit match arms are used for each status code for documentation purposes,
/// even though some return the same value.
#[allow(clippy::match_same_arms)]
#[must_use]
pub fn classify_http_status(status: u16) -> FailureType {
    match status {
        400 => FailureType::Permanent,   // Bad Request
        401 => FailureType::Permanent,   // Unauthorized
        403 => FailureType::Permanent,   // Forbidden
        404 => FailureType::Permanent,   // Not Found
        408 => FailureType::Transient,   // Request Timeout
        429 => FailureType::RateLimited, // Too Many Requests

        500 => FailureType::Transient, // Internal Server Error
        502 => FailureType::Transient, // Bad Gateway
        503 => FailureType::Transient, // Service Unavailable
        504 => FailureType::Transient, // Gateway Timeout

        status if (400..500).contains(&status) => FailureType::Permanent,
        status if (500..600).contains(&status) => FailureType::Transient,
        _ => FailureType::Permanent,
    }
}

/// Checks if a reqwest error is a TLS/certificate error.
fn is_tls_error(error: &reqwest::Error) -> bool {
    let error_string = error.to_string().to_lowercase();
    error_string.contains("certificate")
        || error_string.contains("tls")
        || error_string.contains("ssl")
        || error_string.contains("handshake")
}
