//! Bounded backoff for startup API calls
//!
//! The collection pipeline never retries. Only one-shot calls made while
//! the process starts, such as reading the hub's ClusterVersion, go
//! through [`retry_with_backoff`].
//!
//! # Example
//!
//! ```ignore
//! use clusterlifecycle_state_metrics::retry::{retry_with_backoff, RetryConfig};
//!
//! let version = retry_with_backoff(
//!     &RetryConfig::with_max_attempts(10),
//!     "get_cluster_version",
//!     || async { api.get("version").await.map_err(Error::from) },
//!     |e| !e.is_not_found(),
//! )
//! .await?;
//! ```

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{error, warn};

/// Backoff settings for a retried startup call
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Attempts before giving up, including the first (at least 1)
    pub max_attempts: u32,
    /// Delay after the first failure
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Config with the default delays and the given attempt budget
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    /// Un-jittered delay after failed attempt number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }
}

/// Scale a delay by a random factor in 0.5..1.5
fn jittered(delay: Duration) -> Duration {
    delay.mul_f64(rand::thread_rng().gen_range(0.5..1.5))
}

/// Run `operation` until it succeeds, fails permanently, or the attempt
/// budget is spent
///
/// Errors for which `is_transient` returns false are returned at once.
pub async fn retry_with_backoff<F, Fut, T, E, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    is_transient: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 1;
    loop {
        let e = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if !is_transient(&e) => return Err(e),
            Err(e) => e,
        };

        if attempt >= config.max_attempts {
            error!(operation = %operation_name, attempt, error = %e, "giving up");
            return Err(e);
        }

        let delay = jittered(config.delay_after(attempt));
        warn!(
            operation = %operation_name,
            attempt,
            error = %e,
            delay_ms = delay.as_millis(),
            "transient failure, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
