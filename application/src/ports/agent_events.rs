//! Agent event port.
//!
//! [`AgentEventSink`] is an **output port** that front ends implement to
//! observe a run as it happens. All methods have default no-op
//! implementations, so implementers only override what they display.
//!
//! # Example Implementation
//!
//! ```ignore
//! use taskloop_application::ports::agent_events::AgentEventSink;
//!
//! struct PrintEvents;
//!
//! impl AgentEventSink for PrintEvents {
//!     fn on_final(&self, text: &str) {
//!         println!("{}", text);
//!     }
//! }
//! ```

use std::fmt;
use std::time::Duration;
use taskloop_domain::{TokenUsage, ToolOutcome};

/// Category of an error reported through [`AgentEventSink::on_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Tool arguments were rejected
    Validation,
    /// A tool could not be run
    Executor,
    /// The model call failed
    Model,
    /// Asking the user failed
    UserInput,
    /// The iteration limit was reached
    IterationLimit,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Executor => "executor",
            ErrorKind::Model => "model",
            ErrorKind::UserInput => "user_input",
            ErrorKind::IterationLimit => "iteration_limit",
        };
        f.write_str(s)
    }
}

/// Observer for agent execution.
pub trait AgentEventSink: Send + Sync {
    /// Called before each model call (1-based)
    fn on_iteration(&self, _current: usize, _max: usize) {}

    /// Called with model text that is not a final answer
    fn on_plan(&self, _text: &str) {}

    /// Called before a tool call is validated and run
    fn on_tool_call(&self, _tool_name: &str, _args: &serde_json::Value) {}

    /// Called with the outcome of a tool call
    fn on_tool_result(&self, _tool_name: &str, _outcome: &ToolOutcome) {}

    /// Called when the model asks the user a question
    fn on_question(&self, _text: &str) {}

    /// Called once with the final answer
    fn on_final(&self, _text: &str) {}

    fn on_error(&self, _kind: ErrorKind, _detail: &str) {}

    /// Called with the token usage of each model call
    fn on_token_usage(&self, _usage: TokenUsage) {}

    /// Called before sleeping ahead of a retried model call
    fn on_retry(&self, _attempt: u32, _delay: Duration) {}
}

/// No-op event sink
pub struct NoAgentEvents;

impl AgentEventSink for NoAgentEvents {}
