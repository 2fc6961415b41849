//! Configuration file loading for taskloop
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. Environment: `TASKLOOP_*` nested keys, then the legacy flat variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./taskloop.toml` or `./.taskloop.toml`
//! 4. Global: `$XDG_CONFIG_HOME/taskloop/config.toml`
//! 5. Default values
//!
//! CLI flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    FileAgentConfig, FileConfig, FileLoggingConfig, FileOutputConfig, FileProviderConfig,
    FileProvidersConfig, FileToolsConfig, VERBOSITY_LEVELS,
};
pub use loader::{
    ConfigLoadError, ConfigLoader, ConfigSources, ENV_PREFIX, LEGACY_ENV_VARS, legacy_env_key,
};
