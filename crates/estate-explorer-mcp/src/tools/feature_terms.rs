//! `feature_terms` tool: most frequent amenity terms across listings.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::EstateSession;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct TermsParams {
    #[serde(default = "default_top_k")]
    top_k: usize,
}

fn default_top_k() -> usize {
    25
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "feature_terms".to_string(),
        description: Some("Term frequencies of the amenity feature text".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "top_k": { "type": "integer", "minimum": 0, "default": 25 }
            }
        }),
    }
}

pub async fn execute(args: Value, session: &EstateSession) -> McpResult<ToolCallResult> {
    let params: TermsParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let text = session.store().feature_text()?;
    let terms = estate_explorer::feature_terms(text, params.top_k);

    Ok(ToolCallResult::json(&json!({
        "total": terms.len(),
        "terms": terms,
    })))
}
