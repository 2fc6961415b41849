//! Command Executor port
//!
//! Defines the interface for running a validated tool call as a process.

use async_trait::async_trait;
use taskloop_domain::{ExecutionLimits, ExecutionResult, ToolDefinition, ValidatedArguments};
use thiserror::Error;

/// Failures to run a command at all.
///
/// A command that runs and exits non-zero, or times out, is *not* an error:
/// that is reported in the [`ExecutionResult`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Command not found: {program}")]
    ExecutableMissing { program: String },

    #[error("Permission denied: {program}")]
    PermissionDenied { program: String },

    #[error("Failed to start {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("Tool '{tool}' rendered an empty command")]
    EmptyCommand { tool: String },
}

/// Port for command execution
///
/// Implementations must not involve a shell: each rendered argument is
/// passed to the program as-is.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(
        &self,
        tool: &ToolDefinition,
        arguments: &ValidatedArguments,
        limits: &ExecutionLimits,
    ) -> Result<ExecutionResult, ExecutorError>;
}
