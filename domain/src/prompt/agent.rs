//! Prompt text for the agent loop

/// Control tool the model calls to ask the user a question.
pub const ASK_USER_TOOL: &str = "ask_user";

/// Control tool the model calls to finish with its answer.
pub const FINAL_ANSWER_TOOL: &str = "final_answer";

/// Names catalog tools may not use.
pub const RESERVED_TOOL_NAMES: &[&str] = &[ASK_USER_TOOL, FINAL_ANSWER_TOOL];

/// Templates for generating agent prompts
pub struct AgentPromptTemplate;

impl AgentPromptTemplate {
    /// System prompt sent with every model request.
    pub fn system() -> String {
        format!(
            r#"You are an autonomous agent that accomplishes tasks using command-line tools.

## Workflow

1. Assess the goal and break it down into steps if needed
2. Act autonomously: call one tool at a time and study its result
3. After each result, decide whether the goal is accomplished
4. Ask the user only when you genuinely need clarification

## Rules

- Work autonomously; do not ask permission for each step
- Tool arguments are passed directly to programs, never through a shell:
  pipes, redirects, globbing and variable expansion do not work
- Paths containing ".." are rejected
- When a tool reports a validation error, correct the arguments and retry
- When data is already in the conversation, analyze it directly instead of
  fetching it again

## Finishing

- Call `{final}` with the complete answer once the goal is accomplished
- Call `{ask}` with a specific question if you cannot proceed without the user
"#,
            final = FINAL_ANSWER_TOOL,
            ask = ASK_USER_TOOL,
        )
    }

    /// Description of the `ask_user` control tool.
    pub fn ask_user_description() -> &'static str {
        "Ask the user a clarifying question and wait for the answer. \
         Use only when the goal cannot be accomplished without more information."
    }

    /// Description of the `final_answer` control tool.
    pub fn final_answer_description() -> &'static str {
        "Finish the task. Provide the complete final result for the user."
    }
}
