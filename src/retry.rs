use log::{debug, warn};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    /// The first attempt plus up to 3 retries, 2 seconds apart.
    fn default() -> Self {
        Self::new(4, Duration::from_secs(2))
    }
}

/// Runs `op` until it succeeds, fails with an error `is_retryable` rejects,
/// or the policy's attempts are used up. The last error is returned.
pub async fn retry_with<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    label: &str,
    is_retryable: P,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let mut attempt = 1;
    loop {
        debug!("{} (attempt {}/{})", label, attempt, policy.max_attempts);

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if is_retryable(&e) && attempt < policy.max_attempts => {
                warn!(
                    "{} failed (attempt {}/{}): {}",
                    label, attempt, policy.max_attempts, e
                );
                debug!("Waiting {:?} before retry", policy.delay);
                sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        Busy,
        Broken,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    fn is_busy(e: &TestError) -> bool {
        matches!(e, TestError::Busy)
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result = retry_with(&policy, "op", is_busy, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(TestError::Busy)
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result: Result<(), _> = retry_with(&policy, "op", is_busy, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Busy)
        })
        .await;

        assert!(matches!(result, Err(TestError::Busy)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result: Result<(), _> = retry_with(&policy, "op", is_busy, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Broken)
        })
        .await;

        assert!(matches!(result, Err(TestError::Broken)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_fixed_delay_between_attempts() {
        let policy = RetryPolicy::default();
        let start = tokio::time::Instant::now();

        let _: Result<(), _> =
            retry_with(&policy, "op", is_busy, || async { Err(TestError::Busy) }).await;

        // Three retries, each after a 2 second wait
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[test]
    fn test_default_allows_three_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[test]
    fn test_policy_has_at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
        assert_eq!(RetryPolicy::none().max_attempts, 1);
    }
}
