//! Configuration loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory name under the platform config dir.
pub const APP_DIR: &str = "taskloop";

/// Project config file names, in lookup order.
pub const PROJECT_CONFIG_FILES: &[&str] = &["taskloop.toml", ".taskloop.toml"];

/// Prefix of nested environment overrides (`TASKLOOP_AGENT__MAX_ITERATIONS`).
pub const ENV_PREFIX: &str = "TASKLOOP_";

/// Flat environment variables kept for compatibility, and the keys they set.
pub const LEGACY_ENV_VARS: &[(&str, &str)] = &[
    ("LLM_PROVIDER", "agent.provider"),
    ("LLM_MODEL", "agent.model"),
    ("MAX_ITERATIONS", "agent.max_iterations"),
    ("COMMAND_TIMEOUT", "agent.command_timeout"),
    ("MAX_RETRIES", "agent.max_retries"),
    ("MAX_OUTPUT_SIZE", "agent.max_output_size"),
    ("AUTO_DETECT_CLI", "tools.auto_detect_cli"),
    ("CLI_ALLOWLIST", "tools.cli_allowlist"),
    ("CLI_BLOCKLIST", "tools.cli_blocklist"),
    ("AGENT_VERBOSITY", "output.verbosity"),
];

/// Config key set by a legacy environment variable.
pub fn legacy_env_key(var: &str) -> Option<&'static str> {
    LEGACY_ENV_VARS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(var))
        .map(|(_, key)| *key)
}

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Invalid(#[from] Box<figment::Error>),
}

/// The files and overrides that make up the configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub global: Option<PathBuf>,
    pub project: Option<PathBuf>,
    /// `--config <path>`
    pub explicit: Option<PathBuf>,
    /// Read `TASKLOOP_*` and legacy variables
    pub env: bool,
}

impl ConfigSources {
    /// Standard locations for this process.
    pub fn discover(explicit: Option<PathBuf>) -> Self {
        Self {
            global: ConfigLoader::global_config_path(),
            project: ConfigLoader::project_config_path(Path::new(".")),
            explicit,
            env: true,
        }
    }

    /// Human-readable list of sources, lowest priority first.
    pub fn describe(&self) -> String {
        let mut out = String::from("Configuration sources (lowest to highest priority):\n");
        let mut line = |label: &str, path: Option<&Path>, fallback: &str| {
            let (mark, shown) = match path {
                Some(p) if p.exists() => ("FOUND", p.display().to_string()),
                Some(p) => ("     ", p.display().to_string()),
                None => ("     ", fallback.to_string()),
            };
            let _ = writeln!(out, "  [{}] {:<8} {}", mark, label, shown);
        };
        line("Default:", None, "built-in defaults");
        line("Global:", self.global.as_deref(), "(no config directory)");
        line(
            "Project:",
            self.project.as_deref(),
            "./taskloop.toml or ./.taskloop.toml",
        );
        if let Some(path) = &self.explicit {
            line("Explicit:", Some(path), "");
        }
        let _ = write!(
            out,
            "  [{}] {:<8} {}* and legacy variables",
            if self.env { " ON  " } else { " OFF " },
            "Env:",
            ENV_PREFIX
        );
        out
    }
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. Global: `$XDG_CONFIG_HOME/taskloop/config.toml`
    /// 3. Project: `./taskloop.toml` or `./.taskloop.toml`
    /// 4. Explicit config path (if provided)
    /// 5. Environment: legacy flat variables, then `TASKLOOP_*`
    pub fn load(sources: &ConfigSources) -> Result<FileConfig, ConfigLoadError> {
        Self::figment(sources)?
            .extract()
            .map_err(|e| ConfigLoadError::Invalid(Box::new(e)))
    }

    /// The merged figment, before extraction.
    pub fn figment(sources: &ConfigSources) -> Result<Figment, ConfigLoadError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global) = &sources.global
            && global.exists()
        {
            figment = figment.merge(Toml::file(global));
        }

        if let Some(project) = &sources.project
            && project.exists()
        {
            figment = figment.merge(Toml::file(project));
        }

        if let Some(path) = &sources.explicit {
            if !path.exists() {
                return Err(ConfigLoadError::NotFound(path.clone()));
            }
            figment = figment.merge(Toml::file(path));
        }

        if sources.env {
            let legacy: Vec<&str> = LEGACY_ENV_VARS.iter().map(|(name, _)| *name).collect();
            figment = figment
                .merge(Env::raw().only(&legacy).map(|key| {
                    legacy_env_key(key.as_str())
                        .map(Into::into)
                        .unwrap_or_else(|| key.as_str().to_string().into())
                }))
                .merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// First project config file that exists in `dir`
    pub fn project_config_path(dir: &Path) -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sources(dir: &TempDir) -> ConfigSources {
        ConfigSources {
            global: Some(dir.path().join("global.toml")),
            project: ConfigLoader::project_config_path(dir.path()),
            explicit: None,
            env: false,
        }
    }

    #[test]
    fn test_load_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::load(&sources(&dir)).unwrap();
        assert_eq!(config, ConfigLoader::load_defaults());
    }

    #[test]
    fn test_later_sources_win() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("global.toml"),
            "[agent]\nmax_iterations = 5\nmax_retries = 1\n",
        )
        .unwrap();
        fs::write(dir.path().join(".taskloop.toml"), "[agent]\nmax_iterations = 7\n").unwrap();
        let explicit = dir.path().join("explicit.toml");
        fs::write(&explicit, "[output]\nverbosity = \"debug\"\n").unwrap();

        let config = ConfigLoader::load(&ConfigSources {
            explicit: Some(explicit),
            ..sources(&dir)
        })
        .unwrap();

        assert_eq!(config.agent.max_iterations, 7);
        assert_eq!(config.agent.max_retries, 1);
        assert_eq!(config.output.verbosity, "debug");
        // untouched keys keep their defaults
        assert_eq!(config.agent.command_timeout, 30);
    }

    #[test]
    fn test_project_file_lookup_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".taskloop.toml"), "").unwrap();
        assert_eq!(
            ConfigLoader::project_config_path(dir.path()),
            Some(dir.path().join(".taskloop.toml"))
        );
        fs::write(dir.path().join("taskloop.toml"), "").unwrap();
        assert_eq!(
            ConfigLoader::project_config_path(dir.path()),
            Some(dir.path().join("taskloop.toml"))
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigLoader::load(&ConfigSources {
            explicit: Some(dir.path().join("nope.toml")),
            ..sources(&dir)
        })
        .unwrap_err();
        assert!(matches!(err, ConfigLoadError::NotFound(_)));
    }

    #[test]
    fn test_type_errors_are_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("taskloop.toml"), "[agent]\nmax_iterations = \"many\"\n").unwrap();
        let err = ConfigLoader::load(&sources(&dir)).unwrap_err();
        assert!(err.to_string().contains("max_iterations"));
    }

    #[test]
    fn test_legacy_env_key() {
        assert_eq!(legacy_env_key("LLM_PROVIDER"), Some("agent.provider"));
        assert_eq!(legacy_env_key("cli_allowlist"), Some("tools.cli_allowlist"));
        assert_eq!(legacy_env_key("HOME"), None);
    }

    #[test]
    fn test_describe_marks_found_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("global.toml"), "").unwrap();
        let text = sources(&dir).describe();
        assert!(text.contains("[FOUND] Global:"));
        assert!(text.contains("./taskloop.toml or ./.taskloop.toml"));
    }

    #[test]
    fn test_global_config_path_uses_app_dir() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.ends_with("taskloop/config.toml"));
        }
    }
}
