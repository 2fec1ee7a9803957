//! `valuation` prompt: walk through pricing a property.

use serde_json::Value;

use crate::types::{McpResult, PromptGetResult, PromptMessage};

pub fn expand(args: Value) -> McpResult<PromptGetResult> {
    let property_type = args
        .get("property_type")
        .and_then(|v| v.as_str())
        .unwrap_or("flat");
    let sector = args
        .get("sector")
        .and_then(|v| v.as_str())
        .map(|s| format!(" in {s}"))
        .unwrap_or_default();

    let text = format!(
        "I want to know what a {property_type}{sector} is worth.\n\n\
         Please:\n\
         1. Read estate://domains and ask me for any attribute you still need, \
            offering only the listed values\n\
         2. Call estimate_price with the full set of attributes\n\
         3. Report the low, expected and high price in crore\n\
         4. If the tool rejects a value, show me the accepted values for that field"
    );

    Ok(PromptGetResult {
        description: Some("Guide for valuing a property".to_string()),
        messages: vec![PromptMessage::user(text)],
    })
}
