//! `market_sectors` tool: per-sector price and location averages.

use serde_json::{json, Value};

use crate::session::EstateSession;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "market_sectors".to_string(),
        description: Some(
            "Mean price, price per sqft, built-up area and coordinates for every sector".to_string(),
        ),
        input_schema: json!({ "type": "object", "properties": {} }),
    }
}

pub async fn execute(_args: Value, session: &EstateSession) -> McpResult<ToolCallResult> {
    let sectors = session.store().market()?.sector_summary();

    Ok(ToolCallResult::json(&json!({
        "total": sectors.len(),
        "sectors": sectors,
    })))
}
