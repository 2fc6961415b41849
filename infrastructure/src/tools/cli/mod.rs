//! Auto-detected CLI tools.
//!
//! When enabled, commands from a curated table that are installed on this
//! machine are exposed as `cli_<cmd>` tools:
//!
//! ```text
//! KNOWN_COMMANDS ─▶ allowlist ─▶ blocklists ─▶ safety flags ─▶ which ─▶ cli_<cmd>
//! ```
//!
//! Manual catalog entries with the same name take precedence.

pub mod config;
pub mod discovery;
pub mod known;

pub use config::{CliToolsConfig, parse_command_list};
pub use discovery::{
    CLI_TOOL_PREFIX, DetectedCommand, available_commands, cli_tool_definition,
    generate_cli_tools, is_command_available, is_in_container,
};
pub use known::{DEFAULT_BLOCKLIST, KNOWN_COMMANDS, KnownCommand};
