//! Application layer for taskloop
//!
//! This crate contains the agent loop use case, the retry driver and the
//! port definitions adapters implement. It depends only on the domain layer.

pub mod ports;
pub mod retry;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    agent_events::{AgentEventSink, ErrorKind, NoAgentEvents},
    command_executor::{CommandExecutor, ExecutorError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    model_client::{ModelClient, ModelError},
    user_input::{AutoDoneInput, AutoQuitInput, UserInputError, UserInputPort},
};
pub use retry::{RetryPolicy, RetryingModelClient, Sleeper, TokioSleeper, with_retry};
pub use use_cases::run_agent::{
    AgentFailure, FailureReason, RunAgentError, RunAgentInput, RunAgentOutput, RunAgentUseCase,
};
