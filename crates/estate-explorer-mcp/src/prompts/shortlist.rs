//! `shortlist` prompt: build a shortlist around a landmark.

use serde_json::Value;

use crate::types::{McpError, McpResult, PromptGetResult, PromptMessage};

pub fn expand(args: Value) -> McpResult<PromptGetResult> {
    let landmark = args
        .get("landmark")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::InvalidParams("'landmark' argument is required".to_string()))?;

    let radius = args
        .get("radius_km")
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "5".to_string());

    let text = format!(
        "Help me shortlist apartments near {landmark}.\n\n\
         Please:\n\
         1. Use search_nearby with landmark \"{landmark}\" and radius_km {radius}\n\
         2. If nothing is found, say so and suggest a larger radius\n\
         3. For the closest two results, call recommend_similar to find alternatives\n\
         4. Present one list with distances (km) and similarity scores"
    );

    Ok(PromptGetResult {
        description: Some("Guide for shortlisting properties near a landmark".to_string()),
        messages: vec![PromptMessage::user(text)],
    })
}
