//! `market_brief` prompt: summarise the market, optionally for one sector.

use serde_json::Value;

use crate::types::{McpResult, PromptGetResult, PromptMessage};

pub fn expand(args: Value) -> McpResult<PromptGetResult> {
    let sector = args.get("sector").and_then(|v| v.as_str());

    let focus = match sector {
        Some(s) => format!("the {s} sector"),
        None => "the whole market".to_string(),
    };
    let bhk_arg = sector.unwrap_or("overall");

    let text = format!(
        "Give me a short brief on {focus}.\n\n\
         Please:\n\
         1. Call market_sectors and pick out the most and least expensive sectors per sqft\n\
         2. Call market_bhk with sector \"{bhk_arg}\" for the bedroom mix\n\
         3. Call market_price_spread for typical price ranges by bedroom count\n\
         4. Call feature_terms and mention the most common amenities\n\
         5. Keep the brief under 200 words"
    );

    Ok(PromptGetResult {
        description: Some("Guide for a market summary".to_string()),
        messages: vec![PromptMessage::user(text)],
    })
}
