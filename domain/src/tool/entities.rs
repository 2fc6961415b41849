//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Declared type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    /// List of strings; each element becomes its own argv entry.
    Array,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Schema of a single parameter (one entry of `properties`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub description: String,
    /// Allowed values for string parameters.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    /// Element schema for `array` parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterSpec>>,
}

impl ParameterSpec {
    pub fn new(param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            param_type,
            description: description.into(),
            allowed_values: None,
            items: None,
        }
    }

    /// A string-array parameter.
    pub fn string_array(description: impl Into<String>) -> Self {
        Self {
            items: Some(Box::new(ParameterSpec::new(ParamType::String, ""))),
            ..Self::new(ParamType::Array, description)
        }
    }

    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

fn object_type() -> String {
    "object".to_string()
}

/// JSON-Schema-like description of a tool's parameters.
///
/// ```json
/// {"type": "object",
///  "properties": {"path": {"type": "string", "description": "Directory"}},
///  "required": ["path"]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type", default = "object_type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, ParameterSpec>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self {
            schema_type: object_type(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }
}

impl ParameterSchema {
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Definition of a command-backed tool the model may invoke.
///
/// Catalog files use `command` for the template field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "list_files")
    pub name: String,
    /// Description shown to the model
    pub description: String,
    /// Whitespace-separated command line with `{param}` placeholders
    #[serde(rename = "command")]
    pub command_template: String,
    /// Parameter schema
    #[serde(default)]
    pub parameters: ParameterSchema,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        command_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            command_template: command_template.into(),
            parameters: ParameterSchema::default(),
        }
    }

    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        spec: ParameterSpec,
        required: bool,
    ) -> Self {
        let name = name.into();
        if required {
            self.parameters.required.push(name.clone());
        }
        self.parameters.properties.insert(name, spec);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.properties.get(name)
    }
}

/// A call to a tool with arguments, as requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    pub arguments: HashMap<String, serde_json::Value>,
    /// Provider-assigned identifier pairing the call with its result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
            call_id: None,
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_call_id(mut self, id: impl Into<String>) -> Self {
        self.call_id = Some(id.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Arguments as a JSON object (for wire formats and display)
    pub fn arguments_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.arguments
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definition_builder() {
        let tool = ToolDefinition::new("read_file", "Read a file", "cat {path}")
            .with_parameter(
                "path",
                ParameterSpec::new(ParamType::String, "File path"),
                true,
            );

        assert_eq!(tool.name, "read_file");
        assert!(tool.parameters.is_required("path"));
        assert_eq!(tool.parameter("path").unwrap().param_type, ParamType::String);
        assert!(tool.parameter("missing").is_none());
    }

    #[test]
    fn test_deserialize_catalog_record() {
        let json = r#"{
            "name": "search",
            "description": "Search files",
            "command": "grep -rn {pattern} {path}",
            "parameters": {
                "type": "object",
                "properties": {
                    "pattern": {"type": "string", "description": "Regex"},
                    "path": {"type": "string", "description": "Root"}
                },
                "required": ["pattern"]
            }
        }"#;

        let tool: ToolDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(tool.command_template, "grep -rn {pattern} {path}");
        assert_eq!(tool.parameters.properties.len(), 2);
        assert!(tool.parameters.is_required("pattern"));
        assert!(!tool.parameters.is_required("path"));
    }

    #[test]
    fn test_parameters_default_when_absent() {
        let json = r#"{"name": "date", "description": "Show date", "command": "date"}"#;
        let tool: ToolDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(tool.parameters.schema_type, "object");
        assert!(tool.parameters.properties.is_empty());
    }

    #[test]
    fn test_tool_call() {
        let call = ToolCall::new("read_file")
            .with_arg("path", "./data.txt")
            .with_call_id("call_1");

        assert_eq!(call.get_string("path"), Some("./data.txt"));
        assert_eq!(call.call_id.as_deref(), Some("call_1"));
        assert_eq!(call.arguments_json()["path"], "./data.txt");
    }
}
