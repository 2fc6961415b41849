//! Agent presentation components
//!
//! - [`ConsoleEventSink`]: stderr progress for a run, scaled by [`Verbosity`]
//! - [`InteractiveUserInput`]: terminal answers to the model's questions

pub mod progress;
pub mod user_input;

pub use progress::{ConsoleEventSink, Verbosity};
pub use user_input::InteractiveUserInput;
