//! Retry with exponential backoff for model calls.
//!
//! [`RetryPolicy::next_delay`] is pure, and sleeping goes through the
//! [`Sleeper`] trait, so the schedule can be tested without waiting.
//!
//! ```text
//! attempt 0 ──fail(transient)──▶ sleep 1s ──▶ attempt 1 ──fail──▶ sleep 2s ──▶ ...
//!                                                     └─ after max_retries: RetriesExhausted
//! ```
//!
//! Fatal errors are returned immediately.

use crate::ports::agent_events::AgentEventSink;
use crate::ports::model_client::{ModelClient, ModelError};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use taskloop_domain::{ConversationTurn, ModelReply, ToolRegistry};
use tracing::warn;

/// Backoff schedule for transient model errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before retry number `attempt + 1`: `initial_delay * 2^attempt`,
    /// capped at `max_delay`.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Something that can wait.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Run `op`, retrying transient errors according to `policy`.
///
/// `on_retry(attempt, delay, error)` is called before each sleep with the
/// 1-based number of the retry about to happen. A server-provided
/// `retry_after` replaces the computed delay (still capped).
pub async fn with_retry<T, F, Fut, R>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut op: F,
    mut on_retry: R,
) -> Result<T, ModelError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ModelError>>,
    R: FnMut(u32, Duration, &ModelError),
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() => {
                if attempt >= policy.max_retries {
                    return Err(ModelError::RetriesExhausted {
                        attempts: attempt + 1,
                        last_error: err.to_string(),
                    });
                }
                let delay = err
                    .retry_after()
                    .map(|d| d.min(policy.max_delay))
                    .unwrap_or_else(|| policy.next_delay(attempt));
                attempt += 1;
                on_retry(attempt, delay, &err);
                sleeper.sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Decorates a [`ModelClient`] with [`with_retry`].
pub struct RetryingModelClient<C> {
    inner: C,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    observer: Option<Arc<dyn AgentEventSink>>,
}

impl<C: ModelClient> RetryingModelClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            sleeper: Arc::new(TokioSleeper),
            observer: None,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Report retries to `observer` via [`AgentEventSink::on_retry`].
    pub fn with_observer(mut self, observer: Arc<dyn AgentEventSink>) -> Self {
        self.observer = Some(observer);
        self
    }
}

#[async_trait]
impl<C: ModelClient> ModelClient for RetryingModelClient<C> {
    async fn complete(
        &self,
        history: &[ConversationTurn],
        tools: &ToolRegistry,
    ) -> Result<ModelReply, ModelError> {
        with_retry(
            &self.policy,
            self.sleeper.as_ref(),
            || self.inner.complete(history, tools),
            |attempt, delay, err| {
                warn!(
                    "Model call failed ({}), retry {}/{} in {:?}",
                    err, attempt, self.policy.max_retries, delay
                );
                if let Some(observer) = &self.observer {
                    observer.on_retry(attempt, delay);
                }
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use taskloop_domain::ModelResponse;

    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    struct FlakyClient {
        results: Mutex<VecDeque<Result<ModelReply, ModelError>>>,
        calls: Mutex<usize>,
    }

    impl FlakyClient {
        fn new(results: Vec<Result<ModelReply, ModelError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ModelClient for FlakyClient {
        async fn complete(
            &self,
            _history: &[ConversationTurn],
            _tools: &ToolRegistry,
        ) -> Result<ModelReply, ModelError> {
            *self.calls.lock().unwrap() += 1;
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ModelError::transient("script exhausted")))
        }
    }

    #[derive(Default)]
    struct RetryEvents {
        retries: Mutex<Vec<(u32, Duration)>>,
    }

    impl AgentEventSink for RetryEvents {
        fn on_retry(&self, attempt: u32, delay: Duration) {
            self.retries.lock().unwrap().push((attempt, delay));
        }
    }

    fn answer(text: &str) -> ModelReply {
        ModelReply::new(ModelResponse::FinalAnswer {
            text: text.to_string(),
        })
    }

    #[test]
    fn test_next_delay_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.next_delay(0), Duration::from_secs(1));
        assert_eq!(policy.next_delay(1), Duration::from_secs(2));
        assert_eq!(policy.next_delay(3), Duration::from_secs(8));
        assert_eq!(policy.next_delay(5), Duration::from_secs(30));
        assert_eq!(policy.next_delay(200), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let client = Arc::new(FlakyClient::new(vec![
            Err(ModelError::transient("timeout")),
            Err(ModelError::transient("503")),
            Ok(answer("done")),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let events = Arc::new(RetryEvents::default());
        let retrying = RetryingModelClient::new(client.clone(), RetryPolicy::new(3))
            .with_sleeper(sleeper.clone())
            .with_observer(events.clone());

        let reply = retrying.complete(&[], &ToolRegistry::default()).await.unwrap();

        assert_eq!(reply, answer("done"));
        assert_eq!(client.calls(), 3);
        assert_eq!(
            *sleeper.slept.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
        assert_eq!(
            *events.retries.lock().unwrap(),
            vec![(1, Duration::from_secs(1)), (2, Duration::from_secs(2))]
        );
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let client = Arc::new(FlakyClient::new(vec![Err(ModelError::fatal("401"))]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let retrying = RetryingModelClient::new(client.clone(), RetryPolicy::new(3))
            .with_sleeper(sleeper.clone());

        let err = retrying.complete(&[], &ToolRegistry::default()).await.unwrap_err();

        assert_eq!(err, ModelError::fatal("401"));
        assert_eq!(client.calls(), 1);
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_retries_escalate() {
        let client = Arc::new(FlakyClient::new(vec![]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let retrying = RetryingModelClient::new(client.clone(), RetryPolicy::new(2))
            .with_sleeper(sleeper.clone());

        let err = retrying.complete(&[], &ToolRegistry::default()).await.unwrap_err();

        assert!(matches!(err, ModelError::RetriesExhausted { attempts: 3, .. }));
        assert!(!err.is_transient());
        assert_eq!(client.calls(), 3);
        assert_eq!(sleeper.slept.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_retry_after_hint_is_used() {
        let policy = RetryPolicy::new(1);
        let sleeper = RecordingSleeper::default();
        let mut results = VecDeque::from(vec![
            Err(ModelError::Transient {
                message: "429".into(),
                retry_after: Some(Duration::from_secs(120)),
            }),
            Ok(7),
        ]);

        let value = with_retry(
            &policy,
            &sleeper,
            || {
                let next = results.pop_front().unwrap();
                async move { next }
            },
            |_, _, _| {},
        )
        .await
        .unwrap();

        assert_eq!(value, 7);
        // Hint is capped at max_delay
        assert_eq!(*sleeper.slept.lock().unwrap(), vec![Duration::from_secs(30)]);
    }

    #[tokio::test]
    async fn test_zero_retries_fails_on_first_transient_error() {
        let sleeper = RecordingSleeper::default();
        let err = with_retry(
            &RetryPolicy::new(0),
            &sleeper,
            || async { Err::<(), _>(ModelError::transient("reset")) },
            |_, _, _| {},
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ModelError::RetriesExhausted { attempts: 1, .. }));
    }
}
