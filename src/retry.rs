//! Retry with exponential backoff for external provider calls.
//!
//! Each dependency class gets its own [`RetryPolicy`]. The reasoning
//! provider is expected to recover and retries without bound by default;
//! record providers fail fast so one unreachable source does not stall a
//! job.

use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ProviderError;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

/// Default ceiling on the delay between retries.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(180_000);

/// Default attempt ceiling for record providers.
pub const RECORD_PROVIDER_MAX_ATTEMPTS: u32 = 3;

/// Environment variable that bounds reasoning-provider attempts.
pub const REASONING_MAX_ATTEMPTS_ENV: &str = "CLAIMCHECK_REASONING_MAX_ATTEMPTS";

/// Backoff parameters for one dependency class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Attempt ceiling including the first call; `None` retries forever.
    pub max_attempts: Option<NonZeroU32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::reasoning()
    }
}

impl RetryPolicy {
    /// Unbounded policy for the reasoning provider.
    #[must_use]
    pub const fn reasoning() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            max_attempts: None,
        }
    }

    /// Reasoning policy, bounded by [`REASONING_MAX_ATTEMPTS_ENV`] when set.
    #[must_use]
    pub fn reasoning_from_env() -> Self {
        let bound = std::env::var(REASONING_MAX_ATTEMPTS_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .and_then(NonZeroU32::new);
        Self {
            max_attempts: bound,
            ..Self::reasoning()
        }
    }

    /// Fail-fast policy for record providers.
    #[must_use]
    pub const fn record_provider() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            max_attempts: NonZeroU32::new(RECORD_PROVIDER_MAX_ATTEMPTS),
        }
    }

    /// Sets the attempt ceiling (`0` means unbounded).
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = NonZeroU32::new(attempts);
        self
    }

    /// Sets both delays.
    #[must_use]
    pub const fn with_delays(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_delay = initial;
        self.max_delay = max;
        self
    }

    /// Returns `true` if another attempt is allowed after `attempts` calls.
    #[must_use]
    pub fn allows_another(&self, attempts: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts < max.get())
    }

    /// The sequence of waits between attempts: doubling, capped at
    /// `max_delay`.
    #[must_use]
    pub const fn delays(&self) -> Backoff {
        Backoff {
            next: self.initial_delay,
            max: self.max_delay,
        }
    }
}

/// Infinite iterator of backoff delays.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next.min(self.max);
        self.next = current.saturating_mul(2).min(self.max);
        Some(current)
    }
}

/// Runs `op` until it succeeds, the policy's attempt ceiling is reached, or
/// it returns an error that is not retryable.
///
/// Returns the last error when attempts are exhausted.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut delays = policy.delays();
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(label, attempt, "call succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if !policy.allows_another(attempt) => {
                warn!(label, attempt, error = %e, "retry attempts exhausted");
                return Err(e);
            }
            Err(e) => {
                let delay = delays.next().unwrap_or(policy.max_delay);
                warn!(
                    label,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "call failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::reasoning()
            .with_delays(Duration::from_millis(1), Duration::from_millis(4))
            .with_max_attempts(max_attempts)
    }

    fn transient() -> ProviderError {
        ProviderError::Transient {
            provider: "test".to_string(),
            message: "unavailable".to_string(),
            status: Some(503),
        }
    }

    #[test]
    fn test_reference_delay_sequence() {
        let delays: Vec<u64> = RetryPolicy::reasoning()
            .delays()
            .take(10)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .collect();
        assert_eq!(
            delays,
            vec![1000, 2000, 4000, 8000, 16000, 32000, 64000, 128_000, 180_000, 180_000]
        );
    }

    #[test]
    fn test_class_defaults() {
        assert!(RetryPolicy::reasoning().max_attempts.is_none());
        assert_eq!(
            RetryPolicy::record_provider().max_attempts.map(NonZeroU32::get),
            Some(3)
        );
        assert!(RetryPolicy::reasoning().allows_another(u32::MAX - 1));
        assert!(!RetryPolicy::record_provider().allows_another(3));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = &AtomicU32::new(0);
        let result = retry(&fast(5), "test", move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 { Err(transient()) } else { Ok(n) }
        })
        .await;
        assert_eq!(result.unwrap_or_default(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_ceiling_with_last_error() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = retry(&fast(3), "test", move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Err(ProviderError::Malformed {
                message: format!("attempt {n}"),
            })
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(ProviderError::Malformed { message }) => assert_eq!(message, "attempt 3"),
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_config_errors_fail_immediately() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = retry(&fast(0), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::ApiKeyMissing {
                provider: "lens".to_string(),
                env_var: "LENS_API_KEY".to_string(),
            })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    proptest! {
        #[test]
        fn prop_delays_double_then_cap(initial in 1u64..5_000, cap in 1u64..200_000) {
            let policy = RetryPolicy::reasoning().with_delays(
                Duration::from_millis(initial),
                Duration::from_millis(cap),
            );
            let delays: Vec<Duration> = policy.delays().take(24).collect();
            prop_assert_eq!(delays[0], Duration::from_millis(initial.min(cap)));
            for pair in delays.windows(2) {
                prop_assert!(pair[1] <= Duration::from_millis(cap));
                prop_assert!(pair[1] == pair[0] * 2 || pair[1] == Duration::from_millis(cap));
            }
        }

        #[test]
        fn prop_attempts_never_exceed_ceiling(max in 1u32..6) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap_or_else(|_| unreachable!());
            let calls = &AtomicU32::new(0);
            let policy = RetryPolicy::record_provider()
                .with_delays(Duration::from_millis(0), Duration::from_millis(0))
                .with_max_attempts(max);
            let _ = rt.block_on(retry(&policy, "prop", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(transient())
            }));
            prop_assert_eq!(calls.load(Ordering::SeqCst), max);
        }
    }
}
