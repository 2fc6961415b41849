//! Tool execution value objects

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exit code reported when a command was killed for exceeding its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code reported when a process ended without one (killed by a signal).
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Bounds applied to a single command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    pub timeout: Duration,
    /// Per-stream cap in characters, truncation marker included
    pub max_output_size: usize,
}

impl ExecutionLimits {
    pub fn new(timeout: Duration, max_output_size: usize) -> Self {
        Self {
            timeout,
            max_output_size,
        }
    }
}

/// Outcome of running a tool's command.
///
/// A non-zero exit code or a timeout is ordinary data for the model, not a
/// failure of the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    /// Either stream was cut to fit the output limit
    pub truncated: bool,
    pub timed_out: bool,
    pub duration_ms: u64,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// Text shown to the model for this result.
    pub fn render_for_model(&self) -> String {
        let mut out = String::new();

        if self.timed_out {
            out.push_str(&format!(
                "Error: Command timed out after {:.1} seconds (exit code {})",
                self.duration_ms as f64 / 1000.0,
                self.exit_code
            ));
        } else if self.exit_code != 0 {
            out.push_str(&format!("Error (exit code {})", self.exit_code));
        }

        let stdout = self.stdout.trim_end();
        let stderr = self.stderr.trim_end();

        if !stdout.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(stdout);
        }
        if !stderr.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("--- stderr ---\n");
            out.push_str(stderr);
        }
        if out.is_empty() {
            out.push_str("(no output)");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(stdout: &str, stderr: &str, exit_code: i32) -> ExecutionResult {
        ExecutionResult {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code,
            truncated: false,
            timed_out: false,
            duration_ms: 12,
        }
    }

    #[test]
    fn test_render_success() {
        assert_eq!(result("a.txt\nb.txt\n", "", 0).render_for_model(), "a.txt\nb.txt");
        assert_eq!(result("", "", 0).render_for_model(), "(no output)");
    }

    #[test]
    fn test_render_nonzero_exit_is_data() {
        let r = result("", "grep: nothing matched\n", 1);
        assert!(!r.success());
        assert_eq!(
            r.render_for_model(),
            "Error (exit code 1)\n--- stderr ---\ngrep: nothing matched"
        );
    }

    #[test]
    fn test_render_timeout() {
        let r = ExecutionResult {
            timed_out: true,
            exit_code: TIMEOUT_EXIT_CODE,
            duration_ms: 1000,
            ..result("partial", "", TIMEOUT_EXIT_CODE)
        };
        assert!(!r.success());
        assert!(r
            .render_for_model()
            .starts_with("Error: Command timed out after 1.0 seconds (exit code 124)"));
        assert!(r.render_for_model().ends_with("partial"));
    }
}
