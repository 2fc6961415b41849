//! Transcript logging.
//!
//! Provides [`JsonlConversationLogger`], a JSONL file writer that implements
//! the [`ConversationLogger`](taskloop_application::ConversationLogger) port.

mod transcript;

pub use transcript::JsonlConversationLogger;
