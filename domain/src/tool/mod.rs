//! Tool domain module
//!
//! Defines the **tool system**: the fixed catalog of command-backed tools
//! a model may invoke, and the pure rules that make invoking them safe.
//!
//! ```text
//! ┌────────────────┐   ┌──────────────┐   ┌─────────────────────┐   ┌─────────────────┐
//! │ ToolRegistry   │──▶│ ToolCall     │──▶│ ParameterValidator  │──▶│ template::render│
//! │ (catalog)      │   │ (from model) │   │ → ValidatedArguments│   │ → argv          │
//! └────────────────┘   └──────────────┘   └─────────────────────┘   └─────────────────┘
//! ```
//!
//! Running the rendered argv is an application port (`CommandExecutor`);
//! its outcome is an [`ExecutionResult`].
//!
//! # Key Types
//!
//! - [`ToolDefinition`]: name, description, command template, parameter schema
//! - [`ToolRegistry`]: validated catalog; rejects duplicates, dangling
//!   placeholders and malformed schemas with [`ConfigError`]
//! - [`ParameterValidator`]: type and safety checks producing
//!   [`ValidatedArguments`] or a [`ValidationError`]
//! - [`ExecutionResult`]: captured, truncated output of one command

pub mod entities;
pub mod registry;
pub mod template;
pub mod validation;
pub mod value_objects;

pub use entities::{ParamType, ParameterSchema, ParameterSpec, ToolCall, ToolDefinition};
pub use registry::{ConfigError, ToolNotFound, ToolRegistry};
pub use validation::{ParameterValidator, ValidatedArguments, ValidationError};
pub use value_objects::{ExecutionLimits, ExecutionResult, SIGNAL_EXIT_CODE, TIMEOUT_EXIT_CODE};
