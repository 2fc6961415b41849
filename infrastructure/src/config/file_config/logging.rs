//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ```toml
/// [logging]
/// transcript = "runs/transcript.jsonl"   # JSONL record of every run
/// file = "taskloop.log"                  # tracing output, in addition to stderr
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    pub transcript: Option<PathBuf>,
    pub file: Option<PathBuf>,
}
