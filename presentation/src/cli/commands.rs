//! CLI command definitions

use crate::agent::Verbosity;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Non-interactive answer to the model's questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AutoAnswer {
    /// End the run with the model's last message
    Done,
    /// Abort the run
    Quit,
}

/// CLI arguments for taskloop
#[derive(Parser, Debug)]
#[command(name = "taskloop")]
#[command(author, version, about = "Drive shell-command tools with an LLM until a goal is met")]
#[command(long_about = r#"
taskloop gives a model a catalog of shell-command tools and runs a loop:
the model picks a tool, the arguments are validated, the command runs, and
its output goes back to the model, until it produces a final answer.

Only the final answer is written to stdout. Progress goes to stderr.

Tools come from a JSON catalog (./commands.json, ~/.agent/commands.json or
--tools <path>) and, with --auto-detect-cli, from CLI commands found on PATH.

Configuration files are loaded from (in priority order):
1. Environment        TASKLOOP_AGENT__MAX_ITERATIONS, LLM_PROVIDER, ...
2. --config <path>    Explicit config file
3. ./taskloop.toml    Project-level config
4. ~/.config/taskloop/config.toml   Global config

Example:
  taskloop "How many Rust files are in this repository?"
  taskloop --provider anthropic --auto-detect-cli "Summarize the git log of this week"
  taskloop --auto-answer done --transcript run.jsonl "Find TODO comments"
"#)]
pub struct Cli {
    /// The goal for the agent (words are joined with spaces)
    #[arg(required_unless_present = "show_config", value_name = "GOAL")]
    pub goal: Vec<String>,

    /// Model provider (openai or anthropic)
    #[arg(long, value_name = "NAME")]
    pub provider: Option<String>,

    /// Model name (defaults to the provider's default model)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Maximum number of model calls
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Timeout for each tool command, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Retries for transient model errors
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Maximum characters kept from each output stream
    #[arg(long, value_name = "CHARS")]
    pub max_output_size: Option<usize>,

    /// Path to the tool catalog (JSON)
    #[arg(long, value_name = "PATH")]
    pub tools: Option<PathBuf>,

    /// Add tools for CLI commands found on PATH
    #[arg(long)]
    pub auto_detect_cli: bool,

    /// Only auto-detect these commands (comma-separated)
    #[arg(long, value_name = "CMDS", value_delimiter = ',')]
    pub cli_allow: Vec<String>,

    /// Never auto-detect these commands (comma-separated)
    #[arg(long, value_name = "CMDS", value_delimiter = ',')]
    pub cli_block: Vec<String>,

    /// Directory tools run in; path arguments must stay inside it
    #[arg(short, long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors and the final answer
    #[arg(short, long)]
    pub quiet: bool,

    /// Console verbosity: quiet, normal, verbose or debug
    #[arg(long, value_name = "LEVEL")]
    pub verbosity: Option<Verbosity>,

    /// Answer the model's questions automatically instead of prompting
    #[arg(long, value_enum, value_name = "MODE")]
    pub auto_answer: Option<AutoAnswer>,

    /// Append a JSONL transcript of the run to this file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// The goal as one string.
    pub fn goal_text(&self) -> String {
        self.goal.join(" ").trim().to_string()
    }
}
