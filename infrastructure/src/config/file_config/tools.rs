//! Tools configuration from TOML (`[tools]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [tools]
//! catalog = "tools/commands.json"   # otherwise ./commands.json, ~/.agent/commands.json
//! auto_detect_cli = true
//! cli_allowlist = ["git", "jq", "ls"]
//! cli_blocklist = "curl,wget"       # a comma-separated string works too
//! ```

use crate::tools::cli::{CliToolsConfig, parse_command_list};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use taskloop_domain::{ConfigIssue, ConfigIssueCode};

/// Raw tools configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Explicit catalog path; skips discovery
    pub catalog: Option<PathBuf>,
    /// Offer installed CLI commands as `cli_<cmd>` tools
    #[serde(deserialize_with = "bool_like")]
    pub auto_detect_cli: bool,
    #[serde(deserialize_with = "command_list")]
    pub cli_allowlist: Vec<String>,
    #[serde(deserialize_with = "command_list")]
    pub cli_blocklist: Vec<String>,
    /// Offer file-modifying commands; unset means "only inside a container"
    pub include_docker_only: Option<bool>,
}

impl FileToolsConfig {
    pub fn to_cli_tools_config(&self) -> CliToolsConfig {
        let config = CliToolsConfig::default()
            .with_allowlist(self.cli_allowlist.clone())
            .with_blocklist(self.cli_blocklist.clone());
        match self.include_docker_only {
            Some(include) => config.with_docker_only(include),
            None => config,
        }
    }

    pub(super) fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for command in &self.cli_allowlist {
            if self.cli_blocklist.contains(command) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::AllowBlockConflict,
                    format!(
                        "tools: '{}' is both allowlisted and blocklisted; it will be blocked",
                        command
                    ),
                ));
            }
        }

        if let Some(path) = &self.catalog
            && !path.is_file()
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingCatalog,
                format!("tools.catalog: {} does not exist", path.display()),
            ));
        }

        issues
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolLike {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// Accept `true`, `1` or `"yes"` (environment variables arrive as text).
fn bool_like<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match BoolLike::deserialize(deserializer)? {
        BoolLike::Bool(b) => Ok(b),
        BoolLike::Int(i) => Ok(i != 0),
        BoolLike::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean, got '{}'",
                other
            ))),
        },
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CommandList {
    List(Vec<String>),
    Csv(String),
}

/// Accept either a list or a comma-separated string.
fn command_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match CommandList::deserialize(deserializer)? {
        CommandList::List(items) => items
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        CommandList::Csv(csv) => parse_command_list(&csv),
    })
}
