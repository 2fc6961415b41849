//! Console formatting for run summaries, failures and config issues

use colored::Colorize;
use taskloop_application::{AgentFailure, RunAgentOutput};
use taskloop_domain::core::string::truncate;
use taskloop_domain::{ConfigIssue, ConversationTurn};

/// Turns of history shown when a run fails.
const FAILURE_TAIL_TURNS: usize = 3;

/// Formats run results for stderr.
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// One-line summary after a successful run
    pub fn format_summary(output: &RunAgentOutput) -> String {
        let how = if output.stopped_by_user {
            "stopped by user"
        } else {
            "completed"
        };
        let mut line = format!(
            "{} after {} iteration{}",
            how,
            output.iterations,
            if output.iterations == 1 { "" } else { "s" }
        );
        if output.usage.total() > 0 {
            line.push_str(&format!(
                ", {} tokens ({} in, {} out)",
                output.usage.total(),
                output.usage.input_tokens,
                output.usage.output_tokens
            ));
        }
        format!("{}", line.dimmed())
    }

    /// Failure report with the last few turns of history
    pub fn format_failure(failure: &AgentFailure) -> String {
        let mut output = String::new();
        output.push_str(&Self::section_header("Agent failed"));
        output.push_str(&format!("{} {}\n", "Reason:".red().bold(), failure.reason));
        output.push_str(&format!(
            "{} {} ({} iterations)\n",
            "Phase:".bold(),
            failure.last_phase,
            failure.iterations
        ));

        let tail_start = failure.history.len().saturating_sub(FAILURE_TAIL_TURNS);
        let tail = &failure.history[tail_start..];
        if !tail.is_empty() {
            output.push_str(&format!("\n{}\n", "Last turns:".cyan().bold()));
            for turn in tail {
                output.push_str(&format!(
                    "  {} {}\n",
                    Self::turn_label(turn).dimmed(),
                    truncate(&turn.render_text().replace('\n', " "), 160)
                ));
            }
        }
        output
    }

    /// Config issues, errors first
    pub fn format_config_issues(issues: &[ConfigIssue]) -> String {
        let mut sorted: Vec<&ConfigIssue> = issues.iter().collect();
        sorted.sort_by_key(|issue| !issue.is_error());

        sorted
            .into_iter()
            .map(|issue| {
                if issue.is_error() {
                    format!("{} {}", "error:".red().bold(), issue.message)
                } else {
                    format!("{} {}", "warning:".yellow().bold(), issue.message)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn turn_label(turn: &ConversationTurn) -> &'static str {
        match turn {
            ConversationTurn::Goal { .. } => "[goal]",
            ConversationTurn::ModelMessage { .. } => "[model]",
            ConversationTurn::ToolExchange { .. } => "[tool]",
            ConversationTurn::UserExchange { .. } => "[user]",
            ConversationTurn::FinalAnswer { .. } => "[final]",
            ConversationTurn::Omitted { .. } => "[omitted]",
        }
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.red().bold(), "-".repeat(40))
    }
}
