//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod agent_events;
pub mod command_executor;
pub mod conversation_logger;
pub mod model_client;
pub mod user_input;
