//! Bounded exponential backoff around store calls.
//!
//! [`RetryingStore`] decorates any [`StoreClient`] and retries each call on
//! its own. The purge and reset loops stay unchanged: they simply see fewer
//! transient failures. Retrying a batch delete is safe because deleting an
//! already-deleted document is a no-op.

use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{Document, PageRequest, Result, StoreClient, WriteBatch};

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total number of attempts per call, the first one included
    pub max_attempts:       u32,
    /// Delay before the first retry
    #[serde(with = "millis")]
    pub initial_backoff:    Duration,
    /// Upper bound for any single delay
    #[serde(with = "millis")]
    pub max_backoff:        Duration,
    /// Growth factor between consecutive delays
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts:       3,
            initial_backoff:    Duration::from_millis(100),
            max_backoff:        Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            max_attempts:       1,
            initial_backoff:    Duration::ZERO,
            max_backoff:        Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Delay before retry number `attempt` (0-indexed), capped at `max_backoff`.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let millis = self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        if !millis.is_finite() || millis >= self.max_backoff.as_millis() as f64 {
            return self.max_backoff;
        }
        Duration::from_millis(millis as u64)
    }

    /// Runs `op` until it succeeds, fails with a non-transient error, or the
    /// attempts run out. The last error is returned.
    pub async fn execute<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
        T: Send,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt.saturating_add(1) < attempts => {
                    let delay = self.backoff_for_attempt(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        operation,
                        attempt.saturating_add(1),
                        attempts,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt = attempt.saturating_add(1);
                },
                Err(e) => {
                    debug!("{} failed without retry: {}", operation, e);
                    return Err(e);
                },
            }
        }
    }
}

/// A [`StoreClient`] decorator that applies a [`RetryPolicy`] to every call.
#[derive(Debug)]
pub struct RetryingStore<S> {
    inner:  S,
    policy: RetryPolicy,
}

impl<S> RetryingStore<S> {
    /// Wraps `inner` with `policy`.
    pub const fn new(inner: S, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
        }
    }

    /// The wrapped store.
    pub const fn inner(&self) -> &S { &self.inner }

    /// The policy in effect.
    pub const fn policy(&self) -> &RetryPolicy { &self.policy }
}

#[async_trait::async_trait]
impl<S> StoreClient for RetryingStore<S>
where
    S: StoreClient,
{
    async fn list_collections(&self) -> Result<Vec<String>> {
        self.policy
            .execute("list_collections", || self.inner.list_collections())
            .await
    }

    async fn list_documents(&self, collection: &str, page: PageRequest) -> Result<Vec<Document>> {
        self.policy
            .execute("list_documents", || {
                self.inner.list_documents(collection, page.clone())
            })
            .await
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.policy
            .execute("get_document", || self.inner.get_document(collection, id))
            .await
    }

    async fn set_document(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        self.policy
            .execute("set_document", || {
                self.inner.set_document(collection, id, data.clone())
            })
            .await
    }

    async fn add_document(&self, collection: &str, data: Value) -> Result<String> {
        // Not retried: a lost response would otherwise create a second document.
        self.inner.add_document(collection, data).await
    }

    async fn commit_batch(&self, batch: WriteBatch) -> Result<()> {
        self.policy
            .execute("commit_batch", || self.inner.commit_batch(batch.clone()))
            .await
    }
}

/// Serializes a `Duration` as whole milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
