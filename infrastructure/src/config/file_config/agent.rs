//! Agent configuration from TOML (`[agent]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use taskloop_domain::{ConfigIssue, ConfigIssueCode, ProviderKind};

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// provider = "anthropic"          # "openai" or "anthropic"
/// model = "claude-sonnet-4-5"     # default depends on the provider
/// max_iterations = 10
/// command_timeout = 30            # seconds
/// max_retries = 3
/// max_output_size = 5000          # characters per stream
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub provider: String,
    /// Model name; `None` picks the provider's default
    pub model: Option<String>,
    pub max_iterations: usize,
    /// Per-command timeout in seconds
    pub command_timeout: u64,
    pub max_retries: u32,
    pub max_output_size: usize,
    pub context_token_budget: usize,
    pub keep_recent_turns: usize,
    pub max_consecutive_tool_failures: usize,
    pub workspace_root: Option<PathBuf>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        let defaults = taskloop_domain::AgentConfiguration::default();
        Self {
            provider: defaults.provider.as_str().to_string(),
            model: None,
            max_iterations: defaults.max_iterations,
            command_timeout: defaults.command_timeout_secs,
            max_retries: defaults.max_retries,
            max_output_size: defaults.max_output_size,
            context_token_budget: defaults.context_token_budget,
            keep_recent_turns: defaults.keep_recent_turns,
            max_consecutive_tool_failures: defaults.max_consecutive_tool_failures,
            workspace_root: None,
        }
    }
}

impl FileAgentConfig {
    /// Parse the provider name, falling back to the default with an error issue.
    pub fn parse_provider(&self) -> (ProviderKind, Vec<ConfigIssue>) {
        match self.provider.parse::<ProviderKind>() {
            Ok(kind) => (kind, vec![]),
            Err(message) => (
                ProviderKind::default(),
                vec![ConfigIssue::error(
                    ConfigIssueCode::UnknownProvider,
                    format!("agent.provider: {}", message),
                )],
            ),
        }
    }

    pub(super) fn bound_issues(&self) -> Vec<ConfigIssue> {
        let bounds = [
            ("agent.max_iterations", self.max_iterations as u64),
            ("agent.max_retries", self.max_retries as u64),
            ("agent.command_timeout", self.command_timeout),
            ("agent.max_output_size", self.max_output_size as u64),
            ("agent.context_token_budget", self.context_token_budget as u64),
            ("agent.keep_recent_turns", self.keep_recent_turns as u64),
            (
                "agent.max_consecutive_tool_failures",
                self.max_consecutive_tool_failures as u64,
            ),
        ];
        bounds
            .into_iter()
            .filter(|(_, value)| *value == 0)
            .map(|(field, _)| {
                ConfigIssue::error(
                    ConfigIssueCode::NonPositiveBound,
                    format!("{} must be greater than zero", field),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider() {
        let config = FileAgentConfig {
            provider: "Claude".to_string(),
            ..Default::default()
        };
        assert_eq!(config.parse_provider().0, ProviderKind::Anthropic);

        let config = FileAgentConfig {
            provider: "gemini".to_string(),
            ..Default::default()
        };
        let (kind, issues) = config.parse_provider();
        assert_eq!(kind, ProviderKind::OpenAi);
        assert_eq!(issues[0].code, ConfigIssueCode::UnknownProvider);
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_zero_bounds_are_reported() {
        let config = FileAgentConfig {
            max_iterations: 0,
            command_timeout: 0,
            ..Default::default()
        };
        let issues = config.bound_issues();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].message.contains("agent.max_iterations"));
    }

    #[test]
    fn test_zero_retries_is_reported() {
        let config = FileAgentConfig {
            max_retries: 0,
            ..Default::default()
        };
        let issues = config.bound_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::NonPositiveBound);
        assert!(issues[0].message.contains("agent.max_retries"));
    }
}
