//! Bounded readiness polling.

use std::time::Duration;
use tracing::debug;

use webvec_core::{Result, UploadConfig, WebvecError};

/// Fixed-interval polling with a hard attempt ceiling. Index creation and
/// deletion are asynchronous on the service side; the uploader probes until
/// the operation has taken effect, and never polls indefinitely.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: usize,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: usize) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            interval: config.poll_interval,
            max_attempts: config.poll_max_attempts,
        }
    }

    /// Runs `probe` until it reports true or the attempt ceiling is hit.
    /// Probe errors end the wait immediately; they mean the service is
    /// rejecting us, not that it is still working.
    pub async fn wait_until<F, Fut>(&self, what: &str, mut probe: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<bool>>,
    {
        for attempt in 1..=self.max_attempts {
            if probe().await? {
                debug!(what, attempt, "condition reached");
                return Ok(());
            }
            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }
        Err(WebvecError::Index(format!(
            "timed out waiting for {what} after {} attempts",
            self.max_attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast(max_attempts: usize) -> PollPolicy {
        PollPolicy::new(Duration::ZERO, max_attempts)
    }

    #[tokio::test]
    async fn succeeds_once_probe_turns_true() {
        let calls = Arc::new(AtomicUsize::new(0));
        let probe_calls = calls.clone();

        fast(5)
            .wait_until("index ready", || {
                let calls = probe_calls.clone();
                async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1 >= 3) }
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_the_attempt_ceiling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let probe_calls = calls.clone();

        let err = fast(4)
            .wait_until("index ready", || {
                let calls = probe_calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(false)
                }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn probe_errors_end_the_wait() {
        let calls = Arc::new(AtomicUsize::new(0));
        let probe_calls = calls.clone();

        let err = fast(10)
            .wait_until("index ready", || {
                let calls = probe_calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<bool, _>(WebvecError::Index("forbidden".to_string()))
                }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(err.to_string().contains("forbidden"));
    }
}
