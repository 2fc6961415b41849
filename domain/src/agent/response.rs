//! Model responses as seen by the agent loop.
//!
//! Providers speak different wire formats; adapters reduce every reply to a
//! [`ModelResponse`] so the loop only has four cases to handle.
//!
//! Two control tools are exposed next to the catalog: `ask_user` and
//! `final_answer`. A call to either one is mapped to
//! [`ModelResponse::QuestionForUser`] or [`ModelResponse::FinalAnswer`] by
//! [`ModelResponse::from_tool_call`]. Text-only replies go through
//! [`interpret_text`], which also understands a JSON completion assessment.

use crate::prompt::agent::{ASK_USER_TOOL, FINAL_ANSWER_TOOL};
use crate::tool::ToolCall;
use serde::{Deserialize, Serialize};

/// Question used when `ask_user` arrives without one.
const DEFAULT_QUESTION: &str = "Could you provide more details about what you need?";

/// What the model wants to do next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelResponse {
    ToolCallRequested { call: ToolCall },
    QuestionForUser { text: String },
    FinalAnswer { text: String },
    PlainMessage { text: String },
}

impl ModelResponse {
    /// Map a tool call, routing control tools to their own variants.
    pub fn from_tool_call(call: ToolCall) -> Self {
        match call.tool_name.as_str() {
            ASK_USER_TOOL => ModelResponse::QuestionForUser {
                text: call
                    .get_string("question")
                    .filter(|q| !q.trim().is_empty())
                    .unwrap_or(DEFAULT_QUESTION)
                    .to_string(),
            },
            FINAL_ANSWER_TOOL => ModelResponse::FinalAnswer {
                text: call.get_string("answer").unwrap_or_default().to_string(),
            },
            _ => ModelResponse::ToolCallRequested { call },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelResponse::ToolCallRequested { .. } => "tool_call",
            ModelResponse::QuestionForUser { .. } => "question",
            ModelResponse::FinalAnswer { .. } => "final_answer",
            ModelResponse::PlainMessage { .. } => "message",
        }
    }
}

/// Token counts reported by the provider for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    pub fn add(&mut self, other: TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// One reply from a model client.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    pub response: ModelResponse,
    pub usage: TokenUsage,
    /// Free text the model sent alongside a tool call
    pub thinking: Option<String>,
}

impl ModelReply {
    pub fn new(response: ModelResponse) -> Self {
        Self {
            response,
            usage: TokenUsage::default(),
            thinking: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_thinking(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.thinking = Some(text);
        }
        self
    }
}

/// Self-assessment a model may reply with instead of calling a tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompletionAssessment {
    pub status: AssessmentStatus,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub next_action: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Complete,
    Continue,
    NeedInput,
}

impl CompletionAssessment {
    /// Parse an assessment from text, looking inside a code fence if present.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(extract_json_block(text)).ok()
    }
}

/// Return the body of the first ```json (or bare ```) fence, else the trimmed text.
fn extract_json_block(text: &str) -> &str {
    let text = text.trim();
    let body = if let Some((_, rest)) = text.split_once("```json") {
        rest
    } else if let Some((_, rest)) = text.split_once("```") {
        rest
    } else {
        return text;
    };
    body.split("```").next().unwrap_or(body).trim()
}

/// Classify a text-only model reply.
pub fn interpret_text(text: &str) -> ModelResponse {
    let Some(assessment) = CompletionAssessment::parse(text) else {
        return ModelResponse::PlainMessage {
            text: text.to_string(),
        };
    };

    match assessment.status {
        AssessmentStatus::Complete => ModelResponse::FinalAnswer {
            text: assessment
                .result
                .or(assessment.reasoning)
                .unwrap_or_else(|| text.to_string()),
        },
        AssessmentStatus::NeedInput => match assessment.question {
            Some(question) if !question.trim().is_empty() => {
                ModelResponse::QuestionForUser { text: question }
            }
            _ => ModelResponse::PlainMessage {
                text: text.to_string(),
            },
        },
        AssessmentStatus::Continue => ModelResponse::PlainMessage {
            text: assessment
                .next_action
                .or(assessment.reasoning)
                .unwrap_or_else(|| text.to_string()),
        },
    }
}
