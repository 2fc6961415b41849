//! User input port for answering the model's questions.
//!
//! When the model asks a question, `RunAgentUseCase` suspends on
//! [`UserInputPort::request_input`]. The reply may be a plain answer or a
//! directive (`/done`, `/quit`, `/reset`), parsed by
//! [`UserDirective`](taskloop_domain::UserDirective).
//!
//! # Built-in Implementations
//!
//! - [`AutoQuitInput`] - Always answers `/quit` (the non-interactive default)
//! - [`AutoDoneInput`] - Always answers `/done`
//!
//! For interactive use, see `InteractiveUserInput` in the presentation layer.

use async_trait::async_trait;
use thiserror::Error;

/// Failures while collecting input, as opposed to answers the user gave.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserInputError {
    #[error("Input cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(String),

    /// No more input will ever arrive (e.g. the input stream is closed).
    #[error("Input closed")]
    Closed,
}

/// Port for asking the user a question.
#[async_trait]
pub trait UserInputPort: Send + Sync {
    async fn request_input(&self, question: &str) -> Result<String, UserInputError>;
}

/// Answers every question with `/quit`.
pub struct AutoQuitInput;

#[async_trait]
impl UserInputPort for AutoQuitInput {
    async fn request_input(&self, _question: &str) -> Result<String, UserInputError> {
        Ok("/quit".to_string())
    }
}

/// Answers every question with `/done`.
///
/// Useful for batch runs where a question should end the run with whatever
/// the model has said so far.
pub struct AutoDoneInput;

#[async_trait]
impl UserInputPort for AutoDoneInput {
    async fn request_input(&self, _question: &str) -> Result<String, UserInputError> {
        Ok("/done".to_string())
    }
}
