//! Domain layer for taskloop
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Tools
//!
//! A tool is a named wrapper around an external command. The catalog is
//! validated once ([`ToolRegistry`]); every call the model proposes is
//! checked by [`ParameterValidator`] before a command line is rendered.
//!
//! ## Conversation
//!
//! The run's history is an append-only list of [`ConversationTurn`]s.
//! Snapshots sent to the model may be truncated to fit a token budget.
//!
//! ## Agent
//!
//! [`AgentState`] tracks the phase (`Planning`, `Executing`, `AwaitingUser`,
//! and the terminal phases) and the iteration counter.

pub mod agent;
pub mod conversation;
pub mod core;
pub mod prompt;
pub mod tool;

// Re-export commonly used types
pub use agent::{
    AgentConfiguration, AgentPhase, AgentState, ConfigIssue, ConfigIssueCode, ConfigurationError,
    ModelReply, ModelResponse, ProviderKind, Severity, TokenUsage, UserDirective, interpret_text,
};
pub use conversation::{Conversation, ConversationTurn, ToolOutcome};
pub use prompt::{ASK_USER_TOOL, AgentPromptTemplate, FINAL_ANSWER_TOOL, RESERVED_TOOL_NAMES};
pub use tool::{
    ConfigError, ExecutionLimits, ExecutionResult, ParamType, ParameterSchema, ParameterSpec,
    ParameterValidator, SIGNAL_EXIT_CODE, TIMEOUT_EXIT_CODE, ToolCall, ToolDefinition,
    ToolNotFound, ToolRegistry, ValidatedArguments, ValidationError,
};
