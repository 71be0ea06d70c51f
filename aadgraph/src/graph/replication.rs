//! Waiting for a written key credential to replicate.
//!
//! The directory is eventually consistent: a credential that was just written
//! can be missing from the next few reads, and reads can even flip between
//! replicas that have and have not seen the write. The waiter polls until the
//! credential has been seen on enough successive reads.

use crate::config::ReplicationConfig;
use crate::error::{CredentialError, CredentialResult, GraphResult};
use crate::graph::credentials::find_by_key_id;
use crate::models::KeyCredential;
use provider_common::{Clock, TokioClock};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Polls a credential list until a key ID is consistently visible.
#[derive(Clone)]
pub struct ReplicationWaiter {
    config: ReplicationConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ReplicationWaiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicationWaiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for ReplicationWaiter {
    fn default() -> Self {
        Self::new(ReplicationConfig::default(), Arc::new(TokioClock))
    }
}

impl ReplicationWaiter {
    /// Create a waiter using `clock` for time and sleeping.
    #[must_use]
    pub fn new(config: ReplicationConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Polling configuration.
    #[must_use]
    pub const fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    /// Poll `fetch` until `key_id` has been present on
    /// [`ReplicationConfig::consecutive_hits`] successive reads.
    ///
    /// A `NotFound` from `fetch` counts as not yet replicated.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Timeout`] once `timeout` elapses, or
    /// [`CredentialError::Remote`] for any other error from `fetch`.
    pub async fn wait_for_key_credential<F, Fut>(
        &self,
        key_id: &str,
        timeout: Duration,
        mut fetch: F,
    ) -> CredentialResult<KeyCredential>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = GraphResult<Vec<KeyCredential>>> + Send,
    {
        let required = self.config.consecutive_hits.max(1);
        let deadline = self.clock.now() + timeout;
        let mut hits = 0u32;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match fetch().await {
                Ok(credentials) => match find_by_key_id(&credentials, key_id) {
                    Some(credential) => {
                        hits += 1;
                        debug!(key_id, attempt, hits, required, "Key credential visible");
                        if hits >= required {
                            return Ok(credential.clone());
                        }
                    }
                    None => {
                        hits = 0;
                        debug!(key_id, attempt, "Key credential not replicated yet");
                    }
                },
                Err(e) if e.is_not_found() => {
                    hits = 0;
                    debug!(key_id, attempt, "Credential list not found yet");
                }
                Err(e) => {
                    return Err(CredentialError::remote(
                        format!("waiting for replication of key credential {key_id:?}"),
                        e,
                    ));
                }
            }

            let now = self.clock.now();
            if now >= deadline {
                return Err(CredentialError::Timeout {
                    key_id: key_id.to_string(),
                    timeout,
                });
            }
            self.clock
                .sleep(self.config.poll_interval.min(deadline - now))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use provider_common::ManualClock;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn cred(key_id: &str) -> KeyCredential {
        KeyCredential {
            key_id: Some(key_id.to_string()),
            ..Default::default()
        }
    }

    fn waiter(hits: u32, clock: Arc<ManualClock>) -> ReplicationWaiter {
        ReplicationWaiter::new(
            ReplicationConfig::default()
                .with_poll_interval(Duration::from_secs(1))
                .with_consecutive_hits(hits),
            clock,
        )
    }

    #[tokio::test]
    async fn test_returns_immediately_when_visible() {
        let clock = Arc::new(ManualClock::new());
        let calls = AtomicU32::new(0);

        let found = waiter(1, Arc::clone(&clock))
            .wait_for_key_credential("k1", Duration::from_secs(30), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(vec![cred("k0"), cred("k1")]) }
            })
            .await
            .unwrap();

        assert!(found.has_key_id("k1"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_waits_for_lagging_replica() {
        let clock = Arc::new(ManualClock::new());
        let calls = AtomicU32::new(0);

        let found = waiter(1, Arc::clone(&clock))
            .wait_for_key_credential("k1", Duration::from_secs(30), || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 3 {
                        Ok(Vec::new())
                    } else {
                        Ok(vec![cred("k1")])
                    }
                }
            })
            .await
            .unwrap();

        assert!(found.has_key_id("k1"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(clock.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_miss_resets_consecutive_hits() {
        let clock = Arc::new(ManualClock::new());
        let script = Mutex::new(vec![true, true, false, true, true, true].into_iter());
        let calls = AtomicU32::new(0);

        waiter(3, Arc::clone(&clock))
            .wait_for_key_credential("k1", Duration::from_secs(30), || {
                calls.fetch_add(1, Ordering::SeqCst);
                let visible = script.lock().unwrap().next().unwrap_or(true);
                async move { Ok(if visible { vec![cred("k1")] } else { Vec::new() }) }
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_not_found_is_pending() {
        let clock = Arc::new(ManualClock::new());
        let calls = AtomicU32::new(0);

        let result = waiter(1, clock)
            .wait_for_key_credential("k1", Duration::from_secs(30), || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(GraphError::not_found("applications/app-1/keyCredentials"))
                    } else {
                        Ok(vec![cred("k1")])
                    }
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_other_errors_abort() {
        let clock = Arc::new(ManualClock::new());

        let err = waiter(1, clock)
            .wait_for_key_credential("k1", Duration::from_secs(30), || async {
                Err(GraphError::PermissionDenied("applications/app-1".to_string()))
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CredentialError::Remote {
                source: GraphError::PermissionDenied(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_times_out_without_overshooting() {
        let clock = Arc::new(ManualClock::new());
        let calls = AtomicU32::new(0);

        let err = waiter(1, Arc::clone(&clock))
            .wait_for_key_credential("k1", Duration::from_millis(2500), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(vec![cred("other")]) }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CredentialError::Timeout { ref key_id, .. } if key_id == "k1"));
        assert_eq!(clock.elapsed(), Duration::from_millis(2500));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_waiter_uses_tokio_time() {
        let calls = AtomicU32::new(0);
        let waiter = ReplicationWaiter::new(
            ReplicationConfig::default().with_consecutive_hits(2),
            Arc::new(TokioClock),
        );

        waiter
            .wait_for_key_credential("k1", Duration::from_secs(60), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(vec![cred("k1")]) }
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
