//! Prompt domain
//!
//! System prompt and control tool descriptions for the agent loop.

pub mod agent;

pub use agent::{ASK_USER_TOOL, AgentPromptTemplate, FINAL_ANSWER_TOOL, RESERVED_TOOL_NAMES};
