//! Conversation state for one agent run.

use super::turn::ConversationTurn;

/// Ordered, append-only history of one run.
///
/// The first turn is always the goal. Turns are never edited in place;
/// [`clear`](Self::clear) is the only way to shorten the history.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            turns: vec![ConversationTurn::goal(goal)],
        }
    }

    pub fn goal(&self) -> &str {
        match self.turns.first() {
            Some(ConversationTurn::Goal { text }) => text,
            _ => "",
        }
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn into_history(self) -> Vec<ConversationTurn> {
        self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Reset to only the goal turn.
    pub fn clear(&mut self) {
        self.turns.truncate(1);
    }

    /// Text of the most recent model message, if any.
    pub fn last_model_message(&self) -> Option<&str> {
        self.turns.iter().rev().find_map(|turn| match turn {
            ConversationTurn::ModelMessage { text } | ConversationTurn::FinalAnswer { text } => {
                Some(text.as_str())
            }
            _ => None,
        })
    }

    pub fn estimated_tokens(&self) -> usize {
        self.turns.iter().map(|t| t.estimated_tokens()).sum()
    }

    /// Snapshot of the history that fits `token_budget`.
    ///
    /// Rule: the goal and the last `keep_recent` turns are always kept, as
    /// is the most recent tool exchange. If the estimate exceeds the budget,
    /// the oldest turns in between are dropped one by one until it fits, and
    /// a single [`ConversationTurn::Omitted`] marker takes their place right
    /// after the goal. Order of the remaining turns is preserved.
    pub fn truncate_for_context(
        &self,
        token_budget: usize,
        keep_recent: usize,
    ) -> Vec<ConversationTurn> {
        let total = self.estimated_tokens();
        if total <= token_budget || self.turns.len() <= 1 + keep_recent {
            return self.turns.clone();
        }

        let mut protected_from = self.turns.len() - keep_recent.max(1);
        if let Some(last_tool) = self.turns.iter().rposition(|t| t.is_tool_exchange()) {
            protected_from = protected_from.min(last_tool);
        }
        let middle = &self.turns[1..protected_from.max(1)];

        let mut dropped = 0;
        let mut remaining = total;
        while dropped < middle.len() {
            let marker = if dropped > 0 {
                ConversationTurn::Omitted { count: dropped }.estimated_tokens()
            } else {
                0
            };
            if remaining + marker <= token_budget {
                break;
            }
            remaining -= middle[dropped].estimated_tokens();
            dropped += 1;
        }

        if dropped == 0 {
            return self.turns.clone();
        }

        let mut snapshot = Vec::with_capacity(self.turns.len() - dropped + 1);
        snapshot.push(self.turns[0].clone());
        snapshot.push(ConversationTurn::Omitted { count: dropped });
        snapshot.extend(self.turns[1 + dropped..].iter().cloned());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::turn::ToolOutcome;
    use crate::tool::{ExecutionResult, ToolCall};

    fn message(chars: usize) -> ConversationTurn {
        ConversationTurn::model_message("m".repeat(chars))
    }

    fn tool_turn(output: &str) -> ConversationTurn {
        ConversationTurn::tool_exchange(
            ToolCall::new("list_files").with_arg("path", "."),
            ToolOutcome::Executed(ExecutionResult {
                stdout: output.to_string(),
                stderr: String::new(),
                exit_code: 0,
                truncated: false,
                timed_out: false,
                duration_ms: 1,
            }),
        )
    }

    #[test]
    fn test_append_preserves_order() {
        let mut conversation = Conversation::new("list files");
        conversation.append(message(4));
        conversation.append(tool_turn("a.txt"));
        conversation.append(ConversationTurn::final_answer("done"));

        let history = conversation.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0], ConversationTurn::goal("list files"));
        assert!(history[2].is_tool_exchange());
        assert_eq!(conversation.last_model_message(), Some("done"));
    }

    #[test]
    fn test_clear_keeps_only_goal() {
        let mut conversation = Conversation::new("goal");
        conversation.append(message(10));
        conversation.append(message(10));
        conversation.clear();

        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.goal(), "goal");
        assert_eq!(conversation.last_model_message(), None);
    }

    #[test]
    fn test_truncate_within_budget_is_identity() {
        let mut conversation = Conversation::new("goal");
        conversation.append(message(40));
        assert_eq!(
            conversation.truncate_for_context(1_000, 2),
            conversation.history().to_vec()
        );
    }

    #[test]
    fn test_truncate_drops_oldest_middle_turns() {
        let mut conversation = Conversation::new("goal");
        for i in 0..10 {
            conversation.append(ConversationTurn::model_message(format!("{}{}", i, "x".repeat(399))));
        }
        // goal=1 token, each message=100 tokens: total 1001
        let snapshot = conversation.truncate_for_context(450, 2);

        assert_eq!(snapshot[0], ConversationTurn::goal("goal"));
        let ConversationTurn::Omitted { count } = snapshot[1] else {
            panic!("expected omission marker, got {:?}", snapshot[1]);
        };
        // Oldest turns went first; the survivors are the newest ones in order
        assert_eq!(snapshot.len(), 2 + (10 - count));
        assert_eq!(snapshot[2..], conversation.history()[1 + count..]);
        assert!(snapshot.iter().map(|t| t.estimated_tokens()).sum::<usize>() <= 450);
    }

    #[test]
    fn test_truncate_always_keeps_goal_and_recent_turns() {
        let mut conversation = Conversation::new("goal");
        for _ in 0..6 {
            conversation.append(message(4_000));
        }
        let snapshot = conversation.truncate_for_context(10, 3);

        // Budget is unreachable; everything droppable is dropped
        assert_eq!(snapshot.len(), 1 + 1 + 3);
        assert_eq!(snapshot[1], ConversationTurn::Omitted { count: 3 });
        assert_eq!(snapshot[2..], conversation.history()[4..]);
    }

    #[test]
    fn test_truncate_keeps_most_recent_tool_result() {
        let mut conversation = Conversation::new("goal");
        conversation.append(message(4_000));
        conversation.append(tool_turn(&"o".repeat(400)));
        conversation.append(message(4_000));
        conversation.append(message(4_000));

        let snapshot = conversation.truncate_for_context(100, 1);
        assert!(snapshot.iter().any(|t| t.is_tool_exchange()));
        assert_eq!(snapshot[1], ConversationTurn::Omitted { count: 1 });
    }

    #[test]
    fn test_truncate_is_deterministic() {
        let mut conversation = Conversation::new("goal");
        for _ in 0..20 {
            conversation.append(message(200));
        }
        assert_eq!(
            conversation.truncate_for_context(300, 4),
            conversation.truncate_for_context(300, 4)
        );
    }
}
