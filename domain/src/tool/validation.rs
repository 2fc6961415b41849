//! Parameter validation for tool calls.
//!
//! [`ParameterValidator`] checks a proposed call's arguments against the
//! tool's schema and rejects values that are unsafe to hand to a command:
//! path traversal, absolute paths outside the allowed root, null bytes and
//! control characters. Shell metacharacters need no special treatment since
//! commands never run through a shell.

use super::entities::{ParamType, ParameterSpec, ToolDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// A tool call's arguments failed schema or safety checks.
///
/// Fed back to the model as a conversation turn; never terminates a run.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Missing required parameter '{param}' for tool '{tool}'")]
    MissingParameter { tool: String, param: String },

    #[error("Unknown parameter '{param}' for tool '{tool}'")]
    UnknownParameter { tool: String, param: String },

    #[error("Parameter '{param}' must be of type {expected}, got {found}")]
    TypeMismatch {
        param: String,
        expected: ParamType,
        found: String,
    },

    #[error("Parameter '{param}' must be one of [{allowed}], got '{value}'")]
    NotAllowed {
        param: String,
        value: String,
        allowed: String,
    },

    #[error("Invalid path in '{param}': path traversal not allowed")]
    PathTraversal { param: String },

    #[error("Invalid path in '{param}': must be within {root}")]
    OutsideAllowedRoot { param: String, root: String },

    #[error("Parameter '{param}' contains null bytes or control characters")]
    ControlCharacter { param: String },
}

/// Arguments that passed validation, rendered as argv strings.
///
/// Scalars map to exactly one value; arrays map to one value per element.
/// Absent optional parameters have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedArguments {
    values: BTreeMap<String, Vec<String>>,
}

impl ValidatedArguments {
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.values.get(name).map(|v| v.as_slice())
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.values.insert(name.into(), values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Validates tool arguments against a [`ToolDefinition`].
#[derive(Debug, Clone, Default)]
pub struct ParameterValidator {
    allowed_root: Option<PathBuf>,
}

impl ParameterValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict absolute path arguments to `root`.
    pub fn with_allowed_root(mut self, root: Option<PathBuf>) -> Self {
        self.allowed_root = root;
        self
    }

    pub fn validate(
        &self,
        tool: &ToolDefinition,
        arguments: &HashMap<String, Value>,
    ) -> Result<ValidatedArguments, ValidationError> {
        // Required parameters must be present and non-empty
        for name in &tool.parameters.required {
            let present = match arguments.get(name) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.is_empty(),
                Some(_) => true,
            };
            if !present {
                return Err(ValidationError::MissingParameter {
                    tool: tool.name.clone(),
                    param: name.clone(),
                });
            }
        }

        let mut validated = ValidatedArguments::default();

        // Sorted for deterministic error reporting
        let mut names: Vec<&String> = arguments.keys().collect();
        names.sort();

        for name in names {
            let value = &arguments[name];
            let spec = tool
                .parameter(name)
                .ok_or_else(|| ValidationError::UnknownParameter {
                    tool: tool.name.clone(),
                    param: name.clone(),
                })?;

            // Optional parameters sent as null or "" are treated as absent
            if value.is_null() || value.as_str().is_some_and(str::is_empty) {
                continue;
            }

            let rendered = self.render_value(name, spec, value)?;
            validated.insert(name.clone(), rendered);
        }

        Ok(validated)
    }

    fn render_value(
        &self,
        name: &str,
        spec: &ParameterSpec,
        value: &Value,
    ) -> Result<Vec<String>, ValidationError> {
        let mismatch = || ValidationError::TypeMismatch {
            param: name.to_string(),
            expected: spec.param_type,
            found: json_type_name(value).to_string(),
        };

        match spec.param_type {
            ParamType::String => {
                let s = value.as_str().ok_or_else(mismatch)?;
                self.check_string(name, s)?;
                if let Some(allowed) = &spec.allowed_values
                    && !allowed.iter().any(|a| a == s)
                {
                    return Err(ValidationError::NotAllowed {
                        param: name.to_string(),
                        value: s.to_string(),
                        allowed: allowed.join(", "),
                    });
                }
                Ok(vec![s.to_string()])
            }
            ParamType::Number => {
                match value {
                    Value::Number(n) => Ok(vec![n.to_string()]),
                    _ => Err(mismatch()),
                }
            }
            ParamType::Integer => {
                if let Some(i) = value.as_i64() {
                    Ok(vec![i.to_string()])
                } else if let Some(u) = value.as_u64() {
                    Ok(vec![u.to_string()])
                } else {
                    match value.as_f64() {
                        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => {
                            Ok(vec![format!("{}", f as i64)])
                        }
                        _ => Err(mismatch()),
                    }
                }
            }
            ParamType::Boolean => {
                let b = value.as_bool().ok_or_else(mismatch)?;
                Ok(vec![b.to_string()])
            }
            ParamType::Array => {
                let items = value.as_array().ok_or_else(mismatch)?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let s = item.as_str().ok_or_else(|| ValidationError::TypeMismatch {
                        param: name.to_string(),
                        expected: ParamType::String,
                        found: json_type_name(item).to_string(),
                    })?;
                    self.check_string(name, s)?;
                    out.push(s.to_string());
                }
                Ok(out)
            }
        }
    }

    fn check_string(&self, name: &str, s: &str) -> Result<(), ValidationError> {
        if s.chars().any(|c| c.is_control() && c != '\t' && c != '\n') {
            return Err(ValidationError::ControlCharacter {
                param: name.to_string(),
            });
        }

        if s.contains("..") {
            return Err(ValidationError::PathTraversal {
                param: name.to_string(),
            });
        }

        if let Some(root) = &self.allowed_root {
            let path = Path::new(s);
            if path.has_root() && !lexically_within(path, root) {
                return Err(ValidationError::OutsideAllowedRoot {
                    param: name.to_string(),
                    root: root.display().to_string(),
                });
            }
        }

        Ok(())
    }
}

/// `path` lies under `root` after dropping `.` components.
fn lexically_within(path: &Path, root: &Path) -> bool {
    let normalize = |p: &Path| -> PathBuf {
        p.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    };
    normalize(path).starts_with(normalize(root))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
