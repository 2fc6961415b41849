//! Tool catalog discovery and loading.
//!
//! The catalog is a JSON array of `{name, description, command, parameters}`
//! records. Without an explicit path it is looked up in order:
//!
//! 1. `./commands.json`
//! 2. `~/.agent/commands.json`
//!
//! Auto-detected CLI tools are merged underneath; a manual entry replaces
//! an auto-detected one with the same name.

use std::path::{Path, PathBuf};
use taskloop_domain::{ConfigError, ToolDefinition, ToolRegistry};
use thiserror::Error;
use tracing::{debug, info};

/// File name of the tool catalog.
pub const CATALOG_FILE_NAME: &str = "commands.json";

/// Directory under the home directory holding the fallback catalog.
pub const HOME_CATALOG_DIR: &str = ".agent";

/// The catalog could not be found, read or validated.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(
        "commands.json not found in the current directory or ~/.agent \
         (run from a project directory, create ~/.agent/commands.json, or pass --tools)"
    )]
    NotFound,

    #[error("Tool catalog not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid tool catalog {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Candidate catalog locations, highest priority first.
pub fn catalog_search_paths(cwd: &Path, home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join(CATALOG_FILE_NAME)];
    if let Some(home) = home {
        paths.push(home.join(HOME_CATALOG_DIR).join(CATALOG_FILE_NAME));
    }
    paths
}

/// First existing catalog among the search paths.
pub fn discover_catalog(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    catalog_search_paths(cwd, home)
        .into_iter()
        .find(|p| p.is_file())
}

/// Read and parse a catalog file (schema checks happen in [`ToolRegistry::load`]).
pub fn load_catalog_file(path: &Path) -> Result<Vec<ToolDefinition>, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CatalogError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            CatalogError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_str(&content).map_err(|e| CatalogError::Invalid {
        path: path.to_path_buf(),
        source: ConfigError::Parse(e.to_string()),
    })
}

/// Where the tools of a run come from.
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    /// `--tools` or `[tools] catalog`; skips discovery
    pub explicit: Option<PathBuf>,
    /// Auto-detected CLI tools (empty when detection is off)
    pub detected: Vec<ToolDefinition>,
}

/// Build the run's registry from a catalog file and detected CLI tools.
///
/// A missing catalog is only an error when there is nothing else to offer.
pub fn load_registry(
    source: CatalogSource,
    cwd: &Path,
    home: Option<&Path>,
) -> Result<ToolRegistry, CatalogError> {
    let path = match source.explicit {
        Some(path) => Some(path),
        None => discover_catalog(cwd, home),
    };

    let manual = match &path {
        Some(path) => {
            let tools = load_catalog_file(path)?;
            info!("Loaded {} tools from {}", tools.len(), path.display());
            tools
        }
        None if source.detected.is_empty() => return Err(CatalogError::NotFound),
        None => {
            debug!("No tool catalog found, using auto-detected tools only");
            Vec::new()
        }
    };

    let merged = ToolRegistry::merge(source.detected, manual);
    ToolRegistry::load(merged).map_err(|source| match path {
        Some(path) => CatalogError::Invalid { path, source },
        None => CatalogError::Config(source),
    })
}
