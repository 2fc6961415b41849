//! CLI auto-detection settings (infrastructure-local).
//!
//! Built from the `[tools]` section of the file config, the
//! `AUTO_DETECT_CLI` / `CLI_ALLOWLIST` / `CLI_BLOCKLIST` environment
//! variables, or CLI flags.

/// Which commands auto-detection may offer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliToolsConfig {
    /// If set, only these commands are considered (unknown ones included)
    pub allowlist: Option<Vec<String>>,
    /// Extra commands to exclude, on top of the default blocklist
    pub blocklist: Vec<String>,
    /// Offer docker-only commands; `None` means detect a container
    pub include_docker_only: Option<bool>,
}

impl CliToolsConfig {
    pub fn with_allowlist(mut self, commands: Vec<String>) -> Self {
        self.allowlist = if commands.is_empty() {
            None
        } else {
            Some(commands)
        };
        self
    }

    pub fn with_blocklist(mut self, commands: Vec<String>) -> Self {
        self.blocklist = commands;
        self
    }

    pub fn with_docker_only(mut self, include: bool) -> Self {
        self.include_docker_only = Some(include);
        self
    }
}

/// Parse a comma-separated command list (`"git, ls,,jq"` → `[git, ls, jq]`).
pub fn parse_command_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_list() {
        assert_eq!(parse_command_list("git, ls,,jq "), vec!["git", "ls", "jq"]);
        assert!(parse_command_list("  ").is_empty());
    }

    #[test]
    fn test_empty_allowlist_means_no_restriction() {
        let config = CliToolsConfig::default().with_allowlist(vec![]);
        assert_eq!(config.allowlist, None);
    }
}
