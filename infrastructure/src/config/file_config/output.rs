//! Output configuration from TOML (`[output]` section)

use serde::{Deserialize, Serialize};
use taskloop_domain::{ConfigIssue, ConfigIssueCode};

/// Accepted verbosity names.
pub const VERBOSITY_LEVELS: &[&str] = &["quiet", "normal", "verbose", "debug"];

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// One of [`VERBOSITY_LEVELS`]
    pub verbosity: String,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            verbosity: "normal".to_string(),
            color: true,
        }
    }
}

impl FileOutputConfig {
    pub(super) fn verbosity_issues(&self) -> Vec<ConfigIssue> {
        if VERBOSITY_LEVELS.contains(&self.verbosity.to_ascii_lowercase().as_str()) {
            return vec![];
        }
        vec![ConfigIssue::warning(
            ConfigIssueCode::UnknownVerbosity,
            format!(
                "output.verbosity: unknown value '{}' (expected one of {}), falling back to 'normal'",
                self.verbosity,
                VERBOSITY_LEVELS.join(", ")
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_validation() {
        let config = FileOutputConfig {
            verbosity: "Verbose".to_string(),
            ..Default::default()
        };
        assert!(config.verbosity_issues().is_empty());

        let config = FileOutputConfig {
            verbosity: "loud".to_string(),
            ..Default::default()
        };
        let issues = config.verbosity_issues();
        assert_eq!(issues[0].code, ConfigIssueCode::UnknownVerbosity);
        assert!(!issues[0].is_error());
    }
}
