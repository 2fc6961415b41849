//! Conversation state: the ordered history replayed to the model.
//!
//! - [`turn::ConversationTurn`]: one immutable history entry
//! - [`state::Conversation`]: append-only history with context truncation

pub mod state;
pub mod turn;

pub use state::Conversation;
pub use turn::{ConversationTurn, ToolOutcome, omitted_notice};
