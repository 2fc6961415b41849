//! Shared utilities for use cases.
//!
//! Contains cancellation checking and the cancellable wrapper used around
//! every await point of the agent loop that may block for long.

use crate::use_cases::run_agent::RunAgentError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(RunAgentError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), RunAgentError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(RunAgentError::Cancelled);
    }
    Ok(())
}

/// Await `future` unless the token fires first.
///
/// On cancellation the future is dropped, which is what kills a running
/// child process (`kill_on_drop`) or abandons an HTTP request.
pub(crate) async fn cancellable<F: Future>(
    token: &Option<CancellationToken>,
    future: F,
) -> Result<F::Output, RunAgentError> {
    check_cancelled(token)?;
    match token {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(RunAgentError::Cancelled),
            output = future => Ok(output),
        },
        None => Ok(future.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancellable_without_token_runs_to_completion() {
        let value = cancellable(&None, async { 5 }).await.unwrap();
        assert_eq!(value, 5);
    }

    #[tokio::test]
    async fn test_cancellable_returns_cancelled_when_token_fires() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = cancellable(&Some(token), async {
            tokio::time::sleep(Duration::from_secs(30)).await;
        })
        .await;

        assert!(matches!(result, Err(RunAgentError::Cancelled)));
    }

    #[test]
    fn test_check_cancelled() {
        let token = CancellationToken::new();
        assert!(check_cancelled(&Some(token.clone())).is_ok());
        token.cancel();
        assert!(check_cancelled(&Some(token)).unwrap_err().is_cancelled());
        assert!(check_cancelled(&None).is_ok());
    }
}
