//! Type definitions for the RunAgent use case.

use std::fmt;
use taskloop_domain::{AgentConfiguration, AgentPhase, AgentState, ConversationTurn, TokenUsage};
use thiserror::Error;

/// Why a run ended without an answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    #[error("Reached maximum iterations ({max}) without completing the goal")]
    IterationLimitExceeded { max: usize },

    #[error("Model call failed: {0}")]
    ModelFatal(String),

    #[error("Aborted by user")]
    UserAborted,

    #[error("Could not read user input: {0}")]
    InputFailed(String),
}

/// A failed run, with everything needed to explain it.
#[derive(Debug, Clone)]
pub struct AgentFailure {
    pub reason: FailureReason,
    /// Model calls made before the failure
    pub iterations: usize,
    /// Phase the loop was in when it failed
    pub last_phase: AgentPhase,
    pub history: Vec<ConversationTurn>,
}

impl fmt::Display for AgentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (after {} iterations, while {})",
            self.reason, self.iterations, self.last_phase
        )
    }
}

/// Errors that can occur during Agent execution
#[derive(Error, Debug)]
pub enum RunAgentError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Agent failed: {0}")]
    Failed(Box<AgentFailure>),

    #[error("Operation cancelled")]
    Cancelled,
}

impl RunAgentError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunAgentError::Cancelled)
    }

    pub fn failure(&self) -> Option<&AgentFailure> {
        match self {
            RunAgentError::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Input for the RunAgent use case
#[derive(Debug, Clone)]
pub struct RunAgentInput {
    /// The task to accomplish
    pub goal: String,
    pub config: AgentConfiguration,
}

impl RunAgentInput {
    pub fn new(goal: impl Into<String>, config: AgentConfiguration) -> Self {
        Self {
            goal: goal.into(),
            config,
        }
    }
}

/// Output from the RunAgent use case
#[derive(Debug, Clone)]
pub struct RunAgentOutput {
    /// The final answer
    pub answer: String,
    /// Model calls made
    pub iterations: usize,
    /// Final state of the agent
    pub state: AgentState,
    pub history: Vec<ConversationTurn>,
    /// Total tokens reported by the model client
    pub usage: TokenUsage,
    /// The run ended because the user sent `/done`
    pub stopped_by_user: bool,
}
