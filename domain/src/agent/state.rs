//! Agent state machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of agent execution
///
/// ```text
///            ┌──────────────┐
///  start ──▶ │   Planning   │ ◀──────────────┐
///            └──────┬───────┘                │
///     ┌─────────────┼─────────────┐          │
///     ▼             ▼             ▼          │
///  Executing   AwaitingUser    Done/Failed   │
///     └─────────────┴────────────────────────┘
/// ```
///
/// `Cancelled` can be entered from any non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentPhase {
    /// Waiting on the model's next response
    Planning,
    /// Running a tool call
    Executing,
    /// Waiting on the user's answer to a question
    AwaitingUser,
    Done,
    Failed,
    Cancelled,
}

impl AgentPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentPhase::Planning => "planning",
            AgentPhase::Executing => "executing",
            AgentPhase::AwaitingUser => "awaiting_user",
            AgentPhase::Done => "done",
            AgentPhase::Failed => "failed",
            AgentPhase::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentPhase::Done | AgentPhase::Failed | AgentPhase::Cancelled
        )
    }

    /// Whether the loop may move from `self` to `next`.
    pub fn can_transition_to(&self, next: AgentPhase) -> bool {
        use AgentPhase::*;
        match (self, next) {
            (_, Cancelled) => !self.is_terminal(),
            (Planning, Executing | AwaitingUser | Done | Failed) => true,
            (Executing | AwaitingUser, Planning) => true,
            (AwaitingUser, Done | Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase and iteration counter of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    pub phase: AgentPhase,
    /// Model calls made so far
    pub iteration: usize,
    pub max_iterations: usize,
}

impl AgentState {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            phase: AgentPhase::Planning,
            iteration: 0,
            max_iterations,
        }
    }

    /// Move to `phase`; illegal transitions are ignored and reported as `false`.
    pub fn set_phase(&mut self, phase: AgentPhase) -> bool {
        if self.phase.can_transition_to(phase) {
            self.phase = phase;
            true
        } else {
            false
        }
    }

    /// Count one model call.
    pub fn next_iteration(&mut self) -> usize {
        self.iteration += 1;
        self.iteration
    }

    pub fn iterations_exhausted(&self) -> bool {
        self.iteration >= self.max_iterations
    }
}
