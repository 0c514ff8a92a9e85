use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::core::services::Sleeper;
use crate::core::{FetchUnit, OrdersError};

/// Specifies the backoff strategy for retrying failed requests.
#[derive(Clone, Debug, PartialEq)]
pub enum Backoff {
    /// Uses a fixed delay between retries.
    Fixed(Duration),
    /// Uses an exponential delay between retries.
    /// The delay before retry `n` (0-based) is `base * factor^n`, capped at `max`.
    Exponential {
        /// The delay before the first retry.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: f64,
        /// The maximum duration to wait between retries.
        max: Duration,
    },
}

impl Backoff {
    /// Delay to wait before retry number `retry` (0 = first retry).
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        match self {
            Self::Fixed(d) => *d,
            Self::Exponential { base, factor, max } => {
                let exp = i32::try_from(retry).unwrap_or(i32::MAX);
                let secs = base.as_secs_f64() * factor.powi(exp);
                if !secs.is_finite() || secs >= max.as_secs_f64() {
                    *max
                } else {
                    Duration::from_secs_f64(secs.max(0.0))
                }
            }
        }
    }
}

/// Configuration for the per-unit retry mechanism.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Enables or disables retrying. When disabled every unit gets one attempt.
    pub enabled: bool,
    /// Total attempt budget per unit, including the first attempt.
    pub max_attempts: u32,
    /// The backoff strategy to use between attempts.
    pub backoff: Backoff,
    /// HTTP status codes treated as transient.
    pub retry_on_status: Vec<u16>,
    /// Whether request timeouts are treated as transient.
    pub retry_on_timeout: bool,
    /// Whether connection failures (refused, DNS) are treated as transient.
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            backoff: Backoff::Exponential {
                base: Duration::from_millis(1000),
                factor: 2.0,
                max: Duration::from_secs(30),
            },
            retry_on_status: vec![429, 502, 503, 504],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }
}

/// How a single attempt at a unit failed.
#[derive(Debug)]
pub(crate) enum AttemptFailure {
    /// The service answered with a non-2xx status.
    Status { status: u16, body: String },
    /// No status was received, or the body could not be read.
    Transport {
        timeout: bool,
        connect: bool,
        message: String,
    },
    /// A 2xx body could not be decoded.
    Decode(String),
}

impl AttemptFailure {
    pub(crate) fn from_transport(e: &reqwest::Error) -> Self {
        Self::Transport {
            timeout: e.is_timeout(),
            connect: e.is_connect(),
            message: e.to_string(),
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, body } => write!(f, "status {status}: {body}"),
            Self::Transport {
                timeout: true,
                message,
                ..
            } => write!(f, "timeout: {message}"),
            Self::Transport { message, .. } => write!(f, "network error: {message}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

/// Where the retry state machine goes after a failed attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetryStep {
    /// Wait `delay`, then make attempt `next_attempt`.
    Retry { delay: Duration, next_attempt: u32 },
    /// The failure was transient but the attempt budget is spent.
    Exhausted { attempts: u32 },
    /// The failure is not worth retrying.
    Fatal,
}

impl RetryConfig {
    /// Pure transition out of `Attempting(attempt)` (1-based) after a failure.
    #[must_use]
    pub fn step(&self, attempt: u32, transient: bool) -> RetryStep {
        if !transient {
            return RetryStep::Fatal;
        }
        let budget = if self.enabled {
            self.max_attempts.max(1)
        } else {
            1
        };
        if attempt >= budget {
            return RetryStep::Exhausted { attempts: attempt };
        }
        RetryStep::Retry {
            delay: self.backoff.delay(attempt.saturating_sub(1)),
            next_attempt: attempt + 1,
        }
    }

    pub(crate) fn is_transient(&self, failure: &AttemptFailure) -> bool {
        match failure {
            AttemptFailure::Status { status, .. } => self.retry_on_status.contains(status),
            AttemptFailure::Transport {
                timeout: true, ..
            } => self.retry_on_timeout,
            AttemptFailure::Transport {
                connect: true, ..
            } => self.retry_on_connect,
            AttemptFailure::Transport { .. } => true,
            AttemptFailure::Decode(_) => false,
        }
    }
}

/// Drives `attempt` through the retry state machine for one unit.
///
/// `attempt` receives the 1-based attempt number.
pub(crate) async fn run_with_retry<T, F, Fut>(
    cfg: &RetryConfig,
    sleeper: &dyn Sleeper,
    unit: FetchUnit,
    mut attempt: F,
) -> Result<T, OrdersError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AttemptFailure>>,
{
    let mut n = 1;
    loop {
        let failure = match attempt(n).await {
            Ok(v) => return Ok(v),
            Err(failure) => failure,
        };

        match cfg.step(n, cfg.is_transient(&failure)) {
            RetryStep::Retry {
                delay,
                next_attempt,
            } => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    unit = %unit,
                    attempt = n,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %failure,
                    "transient failure, retrying"
                );
                sleeper.sleep(delay).await;
                n = next_attempt;
            }
            RetryStep::Exhausted { attempts } => {
                return Err(OrdersError::TransientFetch {
                    unit,
                    attempts,
                    reason: failure.to_string(),
                });
            }
            RetryStep::Fatal => {
                return Err(match failure {
                    AttemptFailure::Status { status, body } => {
                        OrdersError::FatalUnit { unit, status, body }
                    }
                    AttemptFailure::Decode(msg) => OrdersError::Data(msg),
                    transport @ AttemptFailure::Transport { .. } => {
                        OrdersError::TransientFetch {
                            unit,
                            attempts: n,
                            reason: transport.to_string(),
                        }
                    }
                });
            }
        }
    }
}
