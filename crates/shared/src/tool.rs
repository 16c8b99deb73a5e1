//! Tool types for Injury Hub
//!
//! Tool definitions exposed to the chat-completion layer, plus helpers for
//! reading arguments out of a tool call.

use crate::error::{HubError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition in function-calling format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Tool name
    pub name: String,

    /// Tool description
    #[serde(default)]
    pub description: Option<String>,

    /// JSON Schema for input parameters
    #[serde(default)]
    pub input_schema: Value,
}

impl Tool {
    /// Create a new tool
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: set input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Names of the required arguments declared by the schema
    pub fn required_arguments(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Read a required, non-blank string argument
pub fn required_str(args: &Value, key: &str) -> Result<String> {
    optional_str(args, key)?
        .ok_or_else(|| HubError::usage(format!("missing required argument '{}'", key)))
}

/// Read an optional string argument; blank strings count as absent
pub fn optional_str(args: &Value, key: &str) -> Result<Option<String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => Err(HubError::usage(format!(
            "argument '{}' must be a string, got {}",
            key, other
        ))),
    }
}

/// Query tools backed by the query façade
pub mod hub_tools {
    use super::*;

    pub const SEARCH_CONDITION: &str = "search_condition";
    pub const FIND_LAW_FIRMS: &str = "find_law_firms";
    pub const GET_SETTLEMENT_DATA: &str = "get_settlement_data";
    pub const LIST_ARTICLES: &str = "list_articles";

    pub fn search_condition() -> Tool {
        Tool::new(SEARCH_CONDITION)
            .with_description(
                "Look up articles, law firms and settlement data for a medical condition or injury.",
            )
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "condition": {
                        "type": "string",
                        "description": "Condition or product name, e.g. 'mesothelioma'"
                    }
                },
                "required": ["condition"]
            }))
    }

    pub fn find_law_firms() -> Tool {
        Tool::new(FIND_LAW_FIRMS)
            .with_description("Find law firms, optionally filtered by specialty and location.")
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "specialty": { "type": "string" },
                    "location": { "type": "string" }
                }
            }))
    }

    pub fn get_settlement_data() -> Tool {
        Tool::new(GET_SETTLEMENT_DATA)
            .with_description("Get settlement ranges and case counts for a condition.")
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "condition": { "type": "string" },
                    "state": { "type": "string" }
                },
                "required": ["condition"]
            }))
    }

    pub fn list_articles() -> Tool {
        Tool::new(LIST_ARTICLES).with_description("List every available condition article.")
    }

    /// Every query tool, in the order they are advertised
    pub fn all() -> Vec<Tool> {
        vec![
            search_condition(),
            find_law_firms(),
            get_settlement_data(),
            list_articles(),
        ]
    }
}
