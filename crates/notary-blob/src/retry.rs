//! Bounded exponential backoff for pinning-service and gateway calls.
//!
//! An attempt is repeated when no response came back at all (connect
//! failure, timeout) or when the service answered 429 or 5xx. Any other
//! response, 4xx included, goes straight back to the caller, which owns
//! status handling.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;

/// Upper bound for a single wait.
const MAX_DELAY: Duration = Duration::from_secs(5);

/// Retry policy of a [`PinataClient`](crate::PinataClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Backoff {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry; doubled for every further retry.
    pub base_delay: Duration,
}

impl Backoff {
    fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << retry.min(16))
            .min(MAX_DELAY)
    }

    /// Run `attempt` until it yields a non-transient outcome or the retries
    /// are spent. The closure rebuilds the request each time, since
    /// multipart bodies cannot be replayed.
    pub(crate) async fn send<F, Fut>(&self, endpoint: &str, attempt: F) -> Result<reqwest::Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut retry = 0;
        loop {
            let outcome = attempt().await;
            let transient = match &outcome {
                Ok(resp) if is_transient_status(resp.status()) => Some(format!("status {}", resp.status().as_u16())),
                Err(e) if is_transient_error(e) => Some(e.to_string()),
                _ => None,
            };
            let Some(reason) = transient else {
                return outcome;
            };
            if retry >= self.max_retries {
                tracing::warn!(endpoint, attempts = retry + 1, reason = %reason, "blob store call gave up");
                return outcome;
            }

            let delay = self.delay_for(retry);
            tracing::warn!(
                endpoint,
                retry = retry + 1,
                max_retries = self.max_retries,
                delay_ms = delay.as_millis() as u64,
                reason = %reason,
                "blob store call failed, backing off"
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn is_transient_error(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn delay_doubles_and_is_capped() {
        let backoff = Backoff {
            max_retries: 10,
            base_delay: Duration::from_millis(200),
        };
        assert_eq!(backoff.delay_for(0), Duration::from_millis(200));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(800));
        assert_eq!(backoff.delay_for(9), MAX_DELAY);
        assert_eq!(backoff.delay_for(40), MAX_DELAY);
    }

    #[test]
    fn only_throttling_and_server_errors_are_transient() {
        assert!(is_transient_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_transient_status(StatusCode::UNAUTHORIZED));
        assert!(!is_transient_status(StatusCode::NOT_FOUND));
        assert!(!is_transient_status(StatusCode::OK));
    }

    #[tokio::test]
    async fn unreachable_host_uses_every_retry() {
        let backoff = Backoff {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
        };
        let calls = Arc::new(AtomicU32::new(0));
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        let result = backoff
            .send("GET /", || {
                calls.fetch_add(1, Ordering::SeqCst);
                http.get("http://127.0.0.1:1/").send()
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
