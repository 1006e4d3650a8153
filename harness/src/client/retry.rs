//! Retry policy and the transport decorator that applies it.

use std::time::Duration;

use async_trait::async_trait;

use super::envelope::Envelope;
use super::transport::{ApiRequest, Transport, TransportError};

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
    /// Response statuses treated as transient
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.multiplier.powi(exponent);
        let delay = self.base_delay.as_secs_f64() * factor;
        if !delay.is_finite() || delay >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(delay)
        }
    }

    /// Whether the outcome of an attempt warrants another one.
    #[must_use]
    pub fn should_retry(&self, outcome: &Result<Envelope, TransportError>) -> bool {
        match outcome {
            Ok(envelope) => self.retry_statuses.contains(&envelope.status),
            Err(err) => err.is_transient(),
        }
    }
}

/// Wraps a [`Transport`] and re-sends transient failures with exponential backoff.
///
/// When every attempt fails, the last outcome is returned as-is: the last
/// envelope for retryable statuses, the last error for transport failures.
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingTransport<T> {
    pub const fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryingTransport<T> {
    async fn send(&self, request: &ApiRequest) -> Result<Envelope, TransportError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let outcome = self.inner.send(request).await;

            if !self.policy.should_retry(&outcome) {
                if attempt > 1 {
                    tracing::info!(
                        method = %request.method,
                        url = %request.url,
                        attempt,
                        "request settled after retry"
                    );
                }
                return outcome;
            }

            if attempt >= max_attempts {
                tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    attempt,
                    max_attempts,
                    "maximum retry attempts reached"
                );
                return outcome;
            }

            let delay = self.policy.delay_for(attempt);
            match &outcome {
                Ok(envelope) => tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    status = envelope.status,
                    attempt,
                    delay = ?delay,
                    "retryable status, backing off"
                ),
                Err(err) => tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    error = %err,
                    attempt,
                    delay = ?delay,
                    "transient failure, backing off"
                ),
            }

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
