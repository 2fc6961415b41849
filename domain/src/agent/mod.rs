//! Agent domain module
//!
//! Contains the run configuration, the phase state machine, the
//! normalized model responses and the user directive parser used by the
//! agent loop.

pub mod config;
pub mod directive;
pub mod response;
pub mod state;
pub mod validation;

pub use config::{AgentConfiguration, ConfigurationError, ProviderKind};
pub use directive::UserDirective;
pub use response::{
    AssessmentStatus, CompletionAssessment, ModelReply, ModelResponse, TokenUsage, interpret_text,
};
pub use state::{AgentPhase, AgentState};
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
