//! Model Client port
//!
//! Defines the interface for asking a language model what to do next.
//! Provider adapters (OpenAI, Anthropic) live in the infrastructure layer;
//! each reduces its wire format to a [`ModelReply`].

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use taskloop_domain::{ConversationTurn, ModelReply, ToolRegistry};
use thiserror::Error;

/// Errors a model client can report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Worth retrying: timeouts, connection resets, rate limits, 5xx
    #[error("Transient model error: {message}")]
    Transient {
        message: String,
        /// Server-provided hint for when to retry
        retry_after: Option<Duration>,
    },

    /// Retrying will not help: bad credentials, malformed request, quota
    #[error("Model error: {0}")]
    Fatal(String),

    #[error("Model call failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl ModelError {
    pub fn transient(message: impl Into<String>) -> Self {
        ModelError::Transient {
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        ModelError::Fatal(message.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ModelError::Transient { .. })
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ModelError::Transient { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Port for model completion
///
/// `history` is the (possibly truncated) conversation; `tools` is the
/// catalog to expose next to the built-in control tools.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(
        &self,
        history: &[ConversationTurn],
        tools: &ToolRegistry,
    ) -> Result<ModelReply, ModelError>;
}

#[async_trait]
impl<T: ModelClient + ?Sized> ModelClient for Box<T> {
    async fn complete(
        &self,
        history: &[ConversationTurn],
        tools: &ToolRegistry,
    ) -> Result<ModelReply, ModelError> {
        (**self).complete(history, tools).await
    }
}

#[async_trait]
impl<T: ModelClient + ?Sized> ModelClient for Arc<T> {
    async fn complete(
        &self,
        history: &[ConversationTurn],
        tools: &ToolRegistry,
    ) -> Result<ModelReply, ModelError> {
        (**self).complete(history, tools).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(ModelError::transient("503").is_transient());
        assert!(!ModelError::fatal("401").is_transient());
        assert!(
            !ModelError::RetriesExhausted {
                attempts: 4,
                last_error: "timeout".into()
            }
            .is_transient()
        );
    }

    #[test]
    fn test_retry_after_only_on_transient() {
        let err = ModelError::Transient {
            message: "rate limited".into(),
            retry_after: Some(Duration::from_secs(7)),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert_eq!(ModelError::fatal("x").retry_after(), None);
    }
}
