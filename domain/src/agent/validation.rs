//! Configuration issues found before a run starts.
//!
//! Unlike [`ConfigurationError`](super::config::ConfigurationError), which
//! stops a run, issues are collected in bulk so a front end can show every
//! problem in a config file at once.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A bound that must be positive is zero.
    NonPositiveBound,
    /// The provider name is not one we can talk to.
    UnknownProvider,
    /// The verbosity name is not recognised.
    UnknownVerbosity,
    /// A CLI command is both allowlisted and blocklisted.
    AllowBlockConflict,
    /// The configured catalog file does not exist.
    MissingCatalog,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_severity() {
        let issue = ConfigIssue::error(ConfigIssueCode::UnknownProvider, "bad provider");
        assert!(issue.is_error());
        let issue = ConfigIssue::warning(ConfigIssueCode::MissingCatalog, "no catalog");
        assert!(!issue.is_error());
        assert_eq!(issue.code, ConfigIssueCode::MissingCatalog);
    }
}
