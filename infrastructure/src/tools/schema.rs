//! JSON Schema tool converter.
//!
//! Produces provider-neutral schemas for the native tool-use APIs: every
//! catalog tool plus the `ask_user` / `final_answer` control tools.

use serde_json::{Value, json};
use taskloop_domain::{
    ASK_USER_TOOL, AgentPromptTemplate, FINAL_ANSWER_TOOL, ParamType, ParameterSpec,
    ToolDefinition, ToolRegistry,
};

/// One tool as the model sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema object for the arguments
    pub parameters: Value,
}

fn property_schema(spec: &ParameterSpec) -> Value {
    let mut prop = serde_json::Map::new();
    prop.insert("type".to_string(), json!(spec.param_type.as_str()));
    if !spec.description.is_empty() {
        prop.insert("description".to_string(), json!(spec.description));
    }
    if let Some(values) = &spec.allowed_values {
        prop.insert("enum".to_string(), json!(values));
    }
    if spec.param_type == ParamType::Array {
        let items = spec
            .items
            .as_deref()
            .map(property_schema)
            .unwrap_or_else(|| json!({"type": "string"}));
        prop.insert("items".to_string(), items);
    }
    Value::Object(prop)
}

/// Converts catalog entries to JSON Schema.
pub struct JsonSchemaToolConverter;

impl JsonSchemaToolConverter {
    pub fn tool_to_schema(tool: &ToolDefinition) -> ToolSchema {
        let properties: serde_json::Map<String, Value> = tool
            .parameters
            .properties
            .iter()
            .map(|(name, spec)| (name.clone(), property_schema(spec)))
            .collect();

        ToolSchema {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: json!({
                "type": "object",
                "properties": properties,
                "required": tool.parameters.required,
            }),
        }
    }

    /// The two control tools, always offered after the catalog.
    pub fn control_tools() -> Vec<ToolSchema> {
        vec![
            ToolSchema {
                name: ASK_USER_TOOL.to_string(),
                description: AgentPromptTemplate::ask_user_description().to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "question": {"type": "string", "description": "The question to ask"}
                    },
                    "required": ["question"],
                }),
            },
            ToolSchema {
                name: FINAL_ANSWER_TOOL.to_string(),
                description: AgentPromptTemplate::final_answer_description().to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "answer": {"type": "string", "description": "The final answer"}
                    },
                    "required": ["answer"],
                }),
            },
        ]
    }

    /// Every tool offered in a request, in catalog order.
    pub fn all_tools(registry: &ToolRegistry) -> Vec<ToolSchema> {
        registry
            .iter()
            .map(Self::tool_to_schema)
            .chain(Self::control_tools())
            .collect()
    }
}
