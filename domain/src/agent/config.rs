//! Agent run configuration.
//!
//! [`AgentConfiguration`] is an immutable value object handed to the agent
//! loop. It is assembled once at startup (config files, environment, CLI
//! flags) and never re-read from the environment afterwards.

use crate::tool::ExecutionLimits;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Language-model backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4",
            ProviderKind::Anthropic => "claude-sonnet-4-5",
        }
    }

    /// Environment variable holding the API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            other => Err(format!(
                "Unsupported LLM provider: {} (expected 'openai' or 'anthropic')",
                other
            )),
        }
    }
}

/// A bound that must be positive was zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("Model name must not be empty")]
    EmptyModel,
}

/// Settings for one agent run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfiguration {
    pub provider: ProviderKind,
    pub model: String,
    /// Upper bound on model calls
    pub max_iterations: usize,
    /// Per-command timeout in seconds
    pub command_timeout_secs: u64,
    pub max_retries: u32,
    /// Per-stream output cap in characters
    pub max_output_size: usize,
    /// Estimated tokens of history sent per model call
    pub context_token_budget: usize,
    /// Most recent turns that survive context truncation
    pub keep_recent_turns: usize,
    /// Consecutive executor failures before a tool is disabled
    pub max_consecutive_tool_failures: usize,
    /// Working directory for commands and root for absolute path arguments
    pub workspace_root: Option<PathBuf>,
}

impl Default for AgentConfiguration {
    fn default() -> Self {
        let provider = ProviderKind::default();
        Self {
            provider,
            model: provider.default_model().to_string(),
            max_iterations: 10,
            command_timeout_secs: 30,
            max_retries: 3,
            max_output_size: 5000,
            context_token_budget: 24_000,
            keep_recent_turns: 8,
            max_consecutive_tool_failures: 3,
            workspace_root: None,
        }
    }
}

impl AgentConfiguration {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            ..Default::default()
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_command_timeout_secs(mut self, secs: u64) -> Self {
        self.command_timeout_secs = secs;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_max_output_size(mut self, size: usize) -> Self {
        self.max_output_size = size;
        self
    }

    pub fn with_context_token_budget(mut self, budget: usize) -> Self {
        self.context_token_budget = budget;
        self
    }

    pub fn with_keep_recent_turns(mut self, turns: usize) -> Self {
        self.keep_recent_turns = turns;
        self
    }

    pub fn with_max_consecutive_tool_failures(mut self, failures: usize) -> Self {
        self.max_consecutive_tool_failures = failures;
        self
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Check that every bound is positive.
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.model.trim().is_empty() {
            return Err(ConfigurationError::EmptyModel);
        }
        let bounds: [(&'static str, u64); 7] = [
            ("max_iterations", self.max_iterations as u64),
            ("max_retries", self.max_retries as u64),
            ("command_timeout", self.command_timeout_secs),
            ("max_output_size", self.max_output_size as u64),
            ("context_token_budget", self.context_token_budget as u64),
            ("keep_recent_turns", self.keep_recent_turns as u64),
            (
                "max_consecutive_tool_failures",
                self.max_consecutive_tool_failures as u64,
            ),
        ];
        match bounds.iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(ConfigurationError::NonPositive { field }),
            None => Ok(()),
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn execution_limits(&self) -> ExecutionLimits {
        ExecutionLimits::new(self.command_timeout(), self.max_output_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AgentConfiguration::default();
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.command_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_output_size, 5000);
        assert_eq!(config.keep_recent_turns, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_names_first_zero_bound() {
        let config = AgentConfiguration::default()
            .with_command_timeout_secs(0)
            .with_max_output_size(0);
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::NonPositive {
                field: "command_timeout"
            })
        );

        let config = AgentConfiguration::default().with_max_iterations(0);
        assert!(config.validate().unwrap_err().to_string().contains("max_iterations"));
    }

    #[test]
    fn test_zero_retries_is_rejected() {
        assert_eq!(
            AgentConfiguration::default().with_max_retries(0).validate(),
            Err(ConfigurationError::NonPositive {
                field: "max_retries"
            })
        );
        assert!(AgentConfiguration::default().with_max_retries(1).validate().is_ok());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("OpenAI".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert_eq!("anthropic".parse::<ProviderKind>(), Ok(ProviderKind::Anthropic));
        assert!("bedrock".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_execution_limits() {
        let limits = AgentConfiguration::default()
            .with_command_timeout_secs(5)
            .with_max_output_size(100)
            .execution_limits();
        assert_eq!(limits.timeout, Duration::from_secs(5));
        assert_eq!(limits.max_output_size, 100);
    }
}
