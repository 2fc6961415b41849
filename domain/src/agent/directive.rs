//! User answers and the slash directives they may carry.

/// How the loop should treat a user's reply to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserDirective {
    /// Ordinary answer, appended to the conversation
    Answer(String),
    /// `/done`: finish with the last model message
    Done,
    /// `/quit`: abort the run
    Quit,
    /// `/reset`: drop everything but the goal and continue
    Reset,
}

impl UserDirective {
    /// Parse a raw reply. Directives are matched case-insensitively on the
    /// trimmed input; anything else is an answer.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "/done" => UserDirective::Done,
            "/quit" | "/exit" => UserDirective::Quit,
            "/reset" => UserDirective::Reset,
            _ => UserDirective::Answer(trimmed.to_string()),
        }
    }
}
