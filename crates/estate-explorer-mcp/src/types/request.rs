//! Parameter payloads for `tools/call`, `resources/read` and `prompts/get`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceReadParams {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptGetParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Decode a required params object, mapping failures to `INVALID_PARAMS`.
pub fn required_params<T: serde::de::DeserializeOwned>(
    params: Option<Value>,
    what: &str,
) -> super::McpResult<T> {
    params
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| super::McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| super::McpError::InvalidParams(format!("{what} params required")))
}
