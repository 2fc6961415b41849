//! Conversation turns

use crate::tool::{ExecutionResult, ToolCall, ValidationError};
use serde::{Deserialize, Serialize};

/// What happened to a tool call the model requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// The command ran (exit code and timeout are part of the result)
    Executed(ExecutionResult),
    /// Arguments failed validation; nothing was run
    Rejected(ValidationError),
    /// The executor could not run the tool at all
    Failed { message: String },
}

impl ToolOutcome {
    pub fn render_for_model(&self) -> String {
        match self {
            ToolOutcome::Executed(result) => result.render_for_model(),
            ToolOutcome::Rejected(err) => {
                format!("Validation error: {}. Correct the arguments and try again.", err)
            }
            ToolOutcome::Failed { message } => format!("Error: {}", message),
        }
    }
}

/// One immutable entry of the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversationTurn {
    Goal { text: String },
    ModelMessage { text: String },
    ToolExchange { call: ToolCall, outcome: ToolOutcome },
    UserExchange { question: String, answer: String },
    FinalAnswer { text: String },
    /// Placeholder for turns dropped from a context snapshot
    Omitted { count: usize },
}

impl ConversationTurn {
    pub fn goal(text: impl Into<String>) -> Self {
        ConversationTurn::Goal { text: text.into() }
    }

    pub fn model_message(text: impl Into<String>) -> Self {
        ConversationTurn::ModelMessage { text: text.into() }
    }

    pub fn tool_exchange(call: ToolCall, outcome: ToolOutcome) -> Self {
        ConversationTurn::ToolExchange { call, outcome }
    }

    pub fn user_exchange(question: impl Into<String>, answer: impl Into<String>) -> Self {
        ConversationTurn::UserExchange {
            question: question.into(),
            answer: answer.into(),
        }
    }

    pub fn final_answer(text: impl Into<String>) -> Self {
        ConversationTurn::FinalAnswer { text: text.into() }
    }

    pub fn is_tool_exchange(&self) -> bool {
        matches!(self, ConversationTurn::ToolExchange { .. })
    }

    /// Plain-text rendering used for display and size estimation.
    pub fn render_text(&self) -> String {
        match self {
            ConversationTurn::Goal { text } => text.clone(),
            ConversationTurn::ModelMessage { text } | ConversationTurn::FinalAnswer { text } => {
                text.clone()
            }
            ConversationTurn::ToolExchange { call, outcome } => format!(
                "{} {}\n{}",
                call.tool_name,
                call.arguments_json(),
                outcome.render_for_model()
            ),
            ConversationTurn::UserExchange { question, answer } => {
                format!("{}\n{}", question, answer)
            }
            ConversationTurn::Omitted { count } => omitted_notice(*count),
        }
    }

    /// Deterministic token estimate: one token per four characters, rounded up.
    pub fn estimated_tokens(&self) -> usize {
        self.render_text().chars().count().div_ceil(4)
    }
}

/// Notice shown to the model in place of dropped turns.
pub fn omitted_notice(count: usize) -> String {
    format!(
        "[{} earlier conversation turns omitted to fit the context window]",
        count
    )
}
