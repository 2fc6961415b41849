//! Interactive answers to the model's questions.
//!
//! The prompt goes to stderr so stdout stays reserved for the final answer.
//!
//! ```text
//! ? Which directory should I clean up?
//!   (answer, or /done to finish, /reset to start over, /quit to abort)
//! answer> build/
//! ```
//!
//! A closed stdin (EOF) is read as `/quit`.

use async_trait::async_trait;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use taskloop_application::{UserInputError, UserInputPort};

/// Answer returned when stdin is closed.
pub const EOF_ANSWER: &str = "/quit";

/// Reads answers from the terminal.
///
/// Stdin is read inside `spawn_blocking`; cancellation is handled by the
/// agent loop, which stops waiting on this future.
pub struct InteractiveUserInput {
    echo_question: bool,
}

impl InteractiveUserInput {
    pub fn new() -> Self {
        Self {
            echo_question: true,
        }
    }

    /// Skip printing the question when an event sink already shows it.
    pub fn with_question_echo(mut self, echo: bool) -> Self {
        self.echo_question = echo;
        self
    }

    fn display_prompt(question: Option<&str>) -> Result<(), UserInputError> {
        let mut err = io::stderr().lock();
        let io_err = |e: io::Error| UserInputError::Io(format!("Failed to write prompt: {}", e));
        if let Some(question) = question {
            writeln!(err, "{} {}", "?".yellow().bold(), question.yellow()).map_err(io_err)?;
        }
        writeln!(
            err,
            "  {}",
            "(answer, or /done to finish, /reset to start over, /quit to abort)".dimmed()
        )
        .map_err(io_err)?;
        write!(err, "{} ", "answer>".magenta().bold()).map_err(io_err)?;
        err.flush().map_err(io_err)
    }
}

impl Default for InteractiveUserInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Read one answer line. Blank lines are skipped; EOF becomes [`EOF_ANSWER`].
pub fn read_answer(reader: &mut impl BufRead) -> Result<String, UserInputError> {
    loop {
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| UserInputError::Io(format!("Failed to read input: {}", e)))?;
        if read == 0 {
            return Ok(EOF_ANSWER.to_string());
        }
        let answer = line.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
    }
}

#[async_trait]
impl UserInputPort for InteractiveUserInput {
    async fn request_input(&self, question: &str) -> Result<String, UserInputError> {
        Self::display_prompt(self.echo_question.then_some(question))?;

        tokio::task::spawn_blocking(|| read_answer(&mut io::stdin().lock()))
            .await
            .map_err(|e| UserInputError::Io(format!("Input task failed: {}", e)))?
    }
}
