//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section is optional; missing keys take their defaults.

mod agent;
mod logging;
mod output;
mod providers;
mod tools;

pub use agent::FileAgentConfig;
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, VERBOSITY_LEVELS};
pub use providers::{FileProviderConfig, FileProvidersConfig};
pub use tools::FileToolsConfig;

use serde::{Deserialize, Serialize};
use taskloop_domain::{AgentConfiguration, ConfigIssue};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub agent: FileAgentConfig,
    pub providers: FileProvidersConfig,
    pub tools: FileToolsConfig,
    pub output: FileOutputConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.agent.parse_provider().1);
        issues.extend(self.agent.bound_issues());
        issues.extend(self.output.verbosity_issues());
        issues.extend(self.tools.issues());
        issues
    }

    /// Build the run configuration. Call [`validate`](Self::validate) first;
    /// an unknown provider falls back to the default here.
    pub fn to_agent_configuration(&self) -> AgentConfiguration {
        let agent = &self.agent;
        let (provider, _) = agent.parse_provider();
        let model = agent
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        let mut config = AgentConfiguration::new(provider, model)
            .with_max_iterations(agent.max_iterations)
            .with_command_timeout_secs(agent.command_timeout)
            .with_max_retries(agent.max_retries)
            .with_max_output_size(agent.max_output_size)
            .with_context_token_budget(agent.context_token_budget)
            .with_keep_recent_turns(agent.keep_recent_turns)
            .with_max_consecutive_tool_failures(agent.max_consecutive_tool_failures);
        if let Some(root) = &agent.workspace_root {
            config = config.with_workspace_root(root.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskloop_domain::{ConfigIssueCode, ProviderKind};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[agent]
provider = "anthropic"
max_iterations = 20
command_timeout = 60

[tools]
auto_detect_cli = true

[output]
verbosity = "verbose"
color = false

[logging]
transcript = "run.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.agent.provider, "anthropic");
        assert_eq!(config.agent.max_iterations, 20);
        assert!(config.tools.auto_detect_cli);
        assert!(!config.output.color);
        assert_eq!(
            config.logging.transcript.as_deref(),
            Some(std::path::Path::new("run.jsonl"))
        );
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.to_agent_configuration(), AgentConfiguration::default());
    }

    #[test]
    fn test_to_agent_configuration() {
        let config: FileConfig = toml::from_str(
            r#"
[agent]
provider = "anthropic"
max_retries = 1
command_timeout = 5
workspace_root = "/srv/project"
"#,
        )
        .unwrap();

        let agent = config.to_agent_configuration();
        assert_eq!(agent.provider, ProviderKind::Anthropic);
        assert_eq!(agent.model, "claude-sonnet-4-5");
        assert_eq!(agent.max_retries, 1);
        assert_eq!(agent.command_timeout_secs, 5);
        assert_eq!(
            agent.workspace_root.as_deref(),
            Some(std::path::Path::new("/srv/project"))
        );
        assert!(agent.validate().is_ok());
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let config: FileConfig = toml::from_str(
            r#"
[agent]
provider = "gemini"
max_iterations = 0

[output]
verbosity = "chatty"
"#,
        )
        .unwrap();

        let codes: Vec<_> = config.validate().into_iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::UnknownProvider,
                ConfigIssueCode::NonPositiveBound,
                ConfigIssueCode::UnknownVerbosity,
            ]
        );
    }
}
