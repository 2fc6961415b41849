//! Tool registry: the validated, read-only catalog for one run.

use super::entities::{ParamType, ToolDefinition};
use super::template::placeholders;
use crate::prompt::agent::RESERVED_TOOL_NAMES;
use std::collections::HashMap;
use thiserror::Error;

/// The tool catalog is malformed. Fatal before any run starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("Tool '{tool}': placeholder '{{{placeholder}}}' has no matching parameter")]
    UnknownPlaceholder { tool: String, placeholder: String },

    #[error("Tool '{tool}': required parameter '{param}' does not appear in the command template")]
    RequiredNotInTemplate { tool: String, param: String },

    #[error("Tool '{tool}': malformed schema: {reason}")]
    MalformedSchema { tool: String, reason: String },

    #[error("Tool name '{0}' is reserved")]
    ReservedName(String),

    #[error("Failed to parse tool catalog: {0}")]
    Parse(String),
}

/// Requested tool does not exist in the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown tool: {0}")]
pub struct ToolNotFound(pub String);

/// Immutable, validated set of tools.
///
/// Iteration follows catalog order. Safe to share across concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Validate and index a collection of tool definitions.
    pub fn load(definitions: Vec<ToolDefinition>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(definitions.len());

        for (i, tool) in definitions.iter().enumerate() {
            check_definition(tool)?;
            if index.insert(tool.name.clone(), i).is_some() {
                return Err(ConfigError::DuplicateTool(tool.name.clone()));
            }
        }

        Ok(Self {
            tools: definitions,
            index,
        })
    }

    /// Parse a JSON array of catalog records and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let definitions: Vec<ToolDefinition> =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::load(definitions)
    }

    pub fn get(&self, name: &str) -> Result<&ToolDefinition, ToolNotFound> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Combine two definition lists; entries in `overrides` replace entries
    /// in `base` with the same name.
    pub fn merge(base: Vec<ToolDefinition>, overrides: Vec<ToolDefinition>) -> Vec<ToolDefinition> {
        let mut merged: Vec<ToolDefinition> = base
            .into_iter()
            .filter(|b| !overrides.iter().any(|o| o.name == b.name))
            .collect();
        merged.extend(overrides);
        merged
    }
}

fn check_definition(tool: &ToolDefinition) -> Result<(), ConfigError> {
    let malformed = |reason: &str| ConfigError::MalformedSchema {
        tool: tool.name.clone(),
        reason: reason.to_string(),
    };

    if tool.name.trim().is_empty() {
        return Err(malformed("tool name is empty"));
    }
    if RESERVED_TOOL_NAMES.contains(&tool.name.as_str()) {
        return Err(ConfigError::ReservedName(tool.name.clone()));
    }
    if tool.command_template.trim().is_empty() {
        return Err(malformed("command template is empty"));
    }

    let schema = &tool.parameters;
    if schema.schema_type != "object" {
        return Err(malformed(&format!(
            "root type must be 'object', got '{}'",
            schema.schema_type
        )));
    }

    for name in &schema.required {
        if !schema.properties.contains_key(name) {
            return Err(malformed(&format!(
                "required parameter '{}' is not declared in properties",
                name
            )));
        }
    }

    for (name, spec) in &schema.properties {
        if spec.param_type == ParamType::Array {
            match &spec.items {
                Some(items) if items.param_type == ParamType::String => {}
                _ => {
                    return Err(malformed(&format!(
                        "array parameter '{}' must declare string items",
                        name
                    )));
                }
            }
        }
        if spec.allowed_values.is_some() && spec.param_type != ParamType::String {
            return Err(malformed(&format!(
                "enum on non-string parameter '{}'",
                name
            )));
        }
    }

    let used = placeholders(&tool.command_template);
    for placeholder in &used {
        if !schema.properties.contains_key(placeholder) {
            return Err(ConfigError::UnknownPlaceholder {
                tool: tool.name.clone(),
                placeholder: placeholder.clone(),
            });
        }
    }

    for name in &schema.required {
        if !used.contains(name) {
            return Err(ConfigError::RequiredNotInTemplate {
                tool: tool.name.clone(),
                param: name.clone(),
            });
        }
    }

    if tool
        .command_template
        .split_whitespace()
        .next()
        .is_some_and(|program| !placeholders(program).is_empty())
    {
        return Err(malformed("program name cannot be a placeholder"));
    }

    Ok(())
}
