//! Presentation layer for taskloop
//!
//! This crate contains the CLI definition, the console event sink,
//! the interactive user-input adapter and output formatters.

pub mod agent;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use agent::{ConsoleEventSink, InteractiveUserInput, Verbosity};
pub use cli::commands::{AutoAnswer, Cli};
pub use output::{ConsoleFormatter, set_color_enabled};
