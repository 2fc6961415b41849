//! Console progress reporting for agent runs
//!
//! Everything here goes to stderr; stdout is reserved for the final answer.
//!
//! | Verbosity | Shows                                                     |
//! |-----------|-----------------------------------------------------------|
//! | `quiet`   | model and input errors only                               |
//! | `normal`  | + tool calls, tool results, questions, retries            |
//! | `verbose` | + model thinking between tool calls                       |
//! | `debug`   | + iteration headers, token usage, every error kind        |

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;
use taskloop_application::{AgentEventSink, ErrorKind};
use taskloop_domain::core::string::truncate;
use taskloop_domain::{TokenUsage, ToolOutcome};

/// Tool results are cut to this many characters on the console.
pub const RESULT_PREVIEW_CHARS: usize = 200;

const ARGS_PREVIEW_CHARS: usize = 120;

/// How much of a run the console shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    /// Combine the configured level with `-q` and `-v` flags.
    ///
    /// `-q` always wins. Each `-v` raises the level by one step but never
    /// lowers a configured level.
    pub fn resolve(configured: Verbosity, quiet: bool, verbose: u8) -> Verbosity {
        if quiet {
            return Verbosity::Quiet;
        }
        let from_flags = match verbose {
            0 => Verbosity::Quiet,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        };
        configured.max(from_flags)
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" => Ok(Verbosity::Quiet),
            "normal" => Ok(Verbosity::Normal),
            "verbose" => Ok(Verbosity::Verbose),
            "debug" => Ok(Verbosity::Debug),
            other => Err(format!("unknown verbosity: {}", other)),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::Debug => "debug",
        };
        f.write_str(s)
    }
}

/// Prints agent events to stderr, with a spinner while the model is working.
pub struct ConsoleEventSink {
    verbosity: Verbosity,
    spinner: Mutex<Option<ProgressBar>>,
    show_spinner: bool,
}

impl ConsoleEventSink {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            spinner: Mutex::new(None),
            show_spinner: verbosity > Verbosity::Quiet,
        }
    }

    /// Disable the spinner (e.g. when stderr is captured)
    pub fn without_spinner(mut self) -> Self {
        self.show_spinner = false;
        self
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn shows(&self, level: Verbosity) -> bool {
        self.verbosity >= level
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start_spinner(&self, message: String) {
        if !self.show_spinner {
            return;
        }
        let Ok(mut slot) = self.spinner.lock() else {
            return;
        };
        if let Some(old) = slot.take() {
            old.finish_and_clear();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        *slot = Some(pb);
    }

    fn clear_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_and_clear();
        }
    }

    /// Clear the spinner, then print one line to stderr.
    fn line(&self, text: String) {
        self.clear_spinner();
        eprintln!("{}", text);
    }
}

impl Drop for ConsoleEventSink {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}

/// One-line summary of a tool outcome, and whether it counts as success.
pub fn outcome_summary(outcome: &ToolOutcome) -> (bool, String) {
    match outcome {
        ToolOutcome::Executed(result) => {
            let mut status = if result.timed_out {
                format!("timed out after {} ms", result.duration_ms)
            } else {
                format!("exit {} in {} ms", result.exit_code, result.duration_ms)
            };
            if result.truncated {
                status.push_str(", truncated");
            }
            let body = if result.stdout.trim().is_empty() {
                result.stderr.trim()
            } else {
                result.stdout.trim()
            };
            let preview = truncate(&body.replace('\n', " "), RESULT_PREVIEW_CHARS);
            let text = if preview.is_empty() {
                status
            } else {
                format!("{}: {}", status, preview)
            };
            (result.success(), text)
        }
        ToolOutcome::Rejected(err) => (false, format!("rejected: {}", err)),
        ToolOutcome::Failed { message } => (false, truncate(message, RESULT_PREVIEW_CHARS)),
    }
}

impl AgentEventSink for ConsoleEventSink {
    fn on_iteration(&self, current: usize, max: usize) {
        if self.shows(Verbosity::Debug) {
            self.line(format!(
                "{}",
                format!("── iteration {}/{} ──", current, max).dimmed()
            ));
        }
        self.start_spinner(format!("Thinking... ({}/{})", current, max));
    }

    fn on_plan(&self, text: &str) {
        self.clear_spinner();
        if self.shows(Verbosity::Verbose) {
            for line in text.trim().lines() {
                eprintln!("  {} {}", "💭".dimmed(), line.dimmed());
            }
        }
    }

    fn on_tool_call(&self, tool_name: &str, args: &serde_json::Value) {
        if self.shows(Verbosity::Normal) {
            let args = truncate(&args.to_string(), ARGS_PREVIEW_CHARS);
            self.line(format!("{} {} {}", "→".blue(), tool_name.cyan(), args.dimmed()));
        }
        self.start_spinner(format!("Running {}", tool_name));
    }

    fn on_tool_result(&self, tool_name: &str, outcome: &ToolOutcome) {
        self.clear_spinner();
        if !self.shows(Verbosity::Normal) {
            return;
        }
        let (ok, summary) = outcome_summary(outcome);
        if ok {
            eprintln!("  {} {} {}", "✓".green(), tool_name.green(), summary.dimmed());
        } else {
            eprintln!("  {} {} {}", "✗".red(), tool_name.red(), summary);
        }
    }

    fn on_question(&self, text: &str) {
        if self.shows(Verbosity::Normal) {
            self.line(format!("{} {}", "?".yellow().bold(), text.yellow()));
        } else {
            self.clear_spinner();
        }
    }

    fn on_final(&self, _text: &str) {
        self.clear_spinner();
        if self.shows(Verbosity::Normal) {
            eprintln!("{}", "✓ Done".green().bold());
        }
    }

    fn on_error(&self, kind: ErrorKind, detail: &str) {
        // Validation and executor errors are already shown as tool results
        let shown = match kind {
            ErrorKind::Validation | ErrorKind::Executor => self.shows(Verbosity::Debug),
            ErrorKind::Model | ErrorKind::UserInput | ErrorKind::IterationLimit => true,
        };
        if shown {
            self.line(format!("{} {}: {}", "✗".red(), kind.to_string().red(), detail));
        }
    }

    fn on_token_usage(&self, usage: TokenUsage) {
        if self.shows(Verbosity::Debug) {
            self.line(format!(
                "{}",
                format!(
                    "   tokens: {} in, {} out",
                    usage.input_tokens, usage.output_tokens
                )
                .dimmed()
            ));
        }
    }

    fn on_retry(&self, attempt: u32, delay: Duration) {
        if self.shows(Verbosity::Normal) {
            self.line(format!(
                "{} model call failed, retry {} in {:.1}s",
                "⟳".yellow(),
                attempt,
                delay.as_secs_f64()
            ));
        }
    }
}
