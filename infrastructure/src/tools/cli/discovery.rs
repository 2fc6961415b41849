//! Detection of usable CLI commands.
//!
//! Candidates come from the curated [`KNOWN_COMMANDS`] table (or the user's
//! allowlist), are filtered by the blocklists and safety flags, and are
//! finally checked with `which`. Each survivor becomes a `cli_<cmd>` tool
//! taking a free-form `args` array.

use super::config::CliToolsConfig;
use super::known::{DEFAULT_BLOCKLIST, KNOWN_COMMANDS, lookup};
use std::collections::BTreeSet;
use std::path::Path;
use taskloop_domain::{ParameterSpec, ToolDefinition};
use tracing::debug;

/// Prefix of auto-detected tool names.
pub const CLI_TOOL_PREFIX: &str = "cli_";

/// Check if a command is available in PATH
pub fn is_command_available(command: &str) -> bool {
    which::which(command).is_ok()
}

/// Whether we are running inside a Docker or Podman container.
pub fn is_in_container() -> bool {
    Path::new("/.dockerenv").exists() || Path::new("/run/.containerenv").exists()
}

/// A command that passed every filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedCommand {
    pub name: String,
    pub description: String,
}

/// Commands that may be offered to the model, sorted by name.
///
/// `in_container` decides docker-only commands when the config does not;
/// `probe` answers whether a command is installed.
pub fn available_commands(
    config: &CliToolsConfig,
    in_container: bool,
    probe: impl Fn(&str) -> bool,
) -> Vec<DetectedCommand> {
    let include_docker_only = config.include_docker_only.unwrap_or(in_container);

    let blocklist: BTreeSet<&str> = DEFAULT_BLOCKLIST
        .iter()
        .copied()
        .chain(config.blocklist.iter().map(String::as_str))
        .collect();

    let candidates: BTreeSet<&str> = match &config.allowlist {
        Some(allow) => allow.iter().map(String::as_str).collect(),
        None => KNOWN_COMMANDS.iter().map(|c| c.name).collect(),
    };

    let mut detected = Vec::new();
    for name in candidates {
        if blocklist.contains(name) {
            continue;
        }

        // Allowlisted commands we know nothing about are treated as docker-only
        let (safe, description) = match lookup(name) {
            Some(known) if known.blocked => continue,
            Some(known) => (known.safe, known.description.to_string()),
            None => (false, format!("Execute {} command", name)),
        };
        if !safe && !include_docker_only {
            continue;
        }

        if !probe(name) {
            debug!("CLI command '{}' not installed, skipping", name);
            continue;
        }

        detected.push(DetectedCommand {
            name: name.to_string(),
            description,
        });
    }
    detected
}

/// Tool name for a command; characters a provider would reject become `_`.
pub fn tool_name_for(command: &str) -> String {
    let sanitized: String = command
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}", CLI_TOOL_PREFIX, sanitized)
}

/// Build a tool definition for a detected command.
pub fn cli_tool_definition(command: &DetectedCommand) -> ToolDefinition {
    ToolDefinition::new(
        tool_name_for(&command.name),
        format!(
            "{}. Runs `{}` with the given arguments (no shell).",
            command.description, command.name
        ),
        format!("{} {{args}}", command.name),
    )
    .with_parameter(
        "args",
        ParameterSpec::string_array(format!(
            "Arguments passed to {}, one element per argument",
            command.name
        )),
        false,
    )
}

/// Detect installed commands on this machine and turn them into tools.
pub fn generate_cli_tools(config: &CliToolsConfig) -> Vec<ToolDefinition> {
    let commands = available_commands(config, is_in_container(), is_command_available);
    debug!("Auto-detected {} CLI tools", commands.len());
    commands.iter().map(cli_tool_definition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskloop_domain::{ParamType, ToolRegistry};

    fn names(commands: &[DetectedCommand]) -> Vec<&str> {
        commands.iter().map(|c| c.name.as_str()).collect()
    }

    fn allow(list: &[&str]) -> CliToolsConfig {
        CliToolsConfig::default().with_allowlist(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_default_detection_skips_unsafe_and_blocked() {
        let found = available_commands(&CliToolsConfig::default(), false, |_| true);
        let found = names(&found);
        assert!(found.contains(&"ls"));
        assert!(found.contains(&"grep"));
        assert!(!found.contains(&"rm"));
        assert!(!found.contains(&"sudo"));
        assert!(!found.contains(&"mv"));
    }

    #[test]
    fn test_docker_only_commands_offered_in_container() {
        let found = available_commands(&CliToolsConfig::default(), true, |_| true);
        let found = names(&found);
        assert!(found.contains(&"mv"));
        assert!(found.contains(&"mkdir"));
        assert!(!found.contains(&"rm"));
    }

    #[test]
    fn test_explicit_docker_only_setting_overrides_detection() {
        let config = CliToolsConfig::default().with_docker_only(false);
        let found = available_commands(&config, true, |_| true);
        assert!(!names(&found).contains(&"mv"));
    }

    #[test]
    fn test_allowlist_restricts_candidates() {
        let found = available_commands(&allow(&["jq", "ls"]), false, |_| true);
        assert_eq!(names(&found), vec!["jq", "ls"]);
    }

    #[test]
    fn test_allowlist_cannot_unblock_dangerous_commands() {
        let found = available_commands(&allow(&["rm", "sudo", "ls"]), true, |_| true);
        assert_eq!(names(&found), vec!["ls"]);
    }

    #[test]
    fn test_user_blocklist_applies() {
        let config = allow(&["jq", "ls"]).with_blocklist(vec!["jq".to_string()]);
        let found = available_commands(&config, false, |_| true);
        assert_eq!(names(&found), vec!["ls"]);
    }

    #[test]
    fn test_unknown_allowlisted_command_needs_container() {
        let config = allow(&["mytool"]);
        assert!(available_commands(&config, false, |_| true).is_empty());

        let found = available_commands(&config, true, |_| true);
        assert_eq!(found[0].description, "Execute mytool command");
    }

    #[test]
    fn test_missing_commands_are_skipped() {
        let found = available_commands(&allow(&["jq", "ls"]), false, |name| name == "ls");
        assert_eq!(names(&found), vec!["ls"]);
    }

    #[test]
    fn test_cli_tool_definition_is_a_valid_catalog_entry() {
        let tool = cli_tool_definition(&DetectedCommand {
            name: "g++".to_string(),
            description: "GNU C++ compiler".to_string(),
        });
        assert_eq!(tool.name, "cli_g__");
        assert_eq!(tool.command_template, "g++ {args}");
        let args = tool.parameter("args").unwrap();
        assert_eq!(args.param_type, ParamType::Array);
        assert!(!tool.parameters.is_required("args"));

        let registry = ToolRegistry::load(vec![tool]).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_is_command_available() {
        assert!(!is_command_available("surely-not-a-real-command-xyz"));
    }
}
