//! Infrastructure layer for taskloop
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: model providers over HTTP, local process
//! execution, tool catalog loading, configuration and transcripts.

pub mod config;
pub mod logging;
pub mod providers;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigLoadError, ConfigLoader, ConfigSources, FileConfig};
pub use logging::JsonlConversationLogger;
pub use providers::{
    AnthropicClient, OpenAiClient, ProviderError, ProviderSettings, create_model_client,
    resolve_api_key,
};
pub use tools::{
    CatalogError, CatalogSource, CliToolsConfig, JsonSchemaToolConverter, LocalCommandExecutor,
    generate_cli_tools, load_registry,
};
