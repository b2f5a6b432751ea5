//! Retry logic with exponential backoff
//!
//! Configurable retry for transient fetch failures, with exponential backoff
//! and optional jitter to prevent thundering herd. Unlike a plain retry
//! wrapper, [`with_retry`] also reports how many attempts were made so the
//! pipeline can record the count in each item's outcome.
//!
//! # Example
//!
//! ```no_run
//! use tune_dl::retry::{IsRetryable, with_retry};
//! use tune_dl::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() {
//! let config = RetryConfig::default();
//! let (result, attempts) = with_retry(&config, || async {
//!     Ok::<_, MyError>(())
//! }).await;
//! assert_eq!(attempts, 1);
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network timeouts, connection reset, truncated
/// artifacts) should return `true`. Permanent failures (unrecognized host,
/// bad input, tagging failures) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::UnexpectedEof
            ),
            // A missing or zero-byte artifact usually means the transfer
            // broke off mid-stream; another attempt may complete it.
            Error::EmptyArtifact { .. } => true,
            // Resolution and host validation failures will not change on
            // a second try.
            Error::Resolution { .. } | Error::LocatorNotFound { .. } => false,
            Error::Fetch { .. } => false,
            Error::Tagging { .. } => false,
            Error::Delivery { .. } => false,
            Error::InvalidSelection { .. } => false,
            Error::StoreCorruption(_) => false,
            Error::Channel(_) => false,
            Error::Config { .. } => false,
            Error::Serialization(_) => false,
            Error::PageOutOfRange { .. } => false,
            Error::Server(_) => false,
            Error::Other(_) => false,
        }
    }
}

/// Execute an async operation with exponential backoff retry logic
///
/// `config.max_attempts` bounds the TOTAL number of attempts, including the
/// first. The returned tuple carries the final result plus the number of
/// attempts actually made, so callers can record it per item.
///
/// Permanent (non-retryable) errors short-circuit: the operation is not
/// retried and the attempt count reflects how far the loop got.
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
) -> (std::result::Result<T, E>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt: u32 = 1;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return (Ok(result), attempt);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "Operation failed, retrying"
                );

                let jittered_delay = if config.jitter {
                    add_jitter(delay)
                } else {
                    delay
                };

                tokio::time::sleep(jittered_delay).await;

                let next_delay =
                    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next_delay.min(config.max_delay);
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "Operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::error!(
                        error = %e,
                        "Operation failed with non-retryable error"
                    );
                }
                return (Err(e), attempt);
            }
        }
    }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// Jitter is uniformly distributed between 0% and 100% of the delay, so the
/// actual delay falls between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    let jittered_secs = delay.as_secs_f64() * (1.0 + jitter_factor);
    Duration::from_secs_f64(jittered_secs)
}
