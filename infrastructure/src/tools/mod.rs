//! Tool infrastructure: catalog loading, CLI auto-detection, schema
//! conversion and local process execution.

pub mod catalog;
pub mod cli;
pub mod executor;
pub mod schema;

pub use catalog::{CatalogError, CatalogSource, catalog_search_paths, discover_catalog, load_registry};
pub use cli::{CliToolsConfig, generate_cli_tools, parse_command_list};
pub use executor::LocalCommandExecutor;
pub use schema::{JsonSchemaToolConverter, ToolSchema};
