//! `market_bhk` tool: bedroom-count distribution, overall or for one sector.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::EstateSession;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct BhkParams {
    #[serde(default)]
    sector: Option<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "market_bhk".to_string(),
        description: Some("Listing counts per bedroom count".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "sector": { "type": "string", "description": "Sector name, or \"overall\" (default)" }
            }
        }),
    }
}

pub async fn execute(args: Value, session: &EstateSession) -> McpResult<ToolCallResult> {
    let params: BhkParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let counts = session
        .store()
        .market()?
        .bhk_distribution(params.sector.as_deref())?;
    let listings: usize = counts.iter().map(|c| c.count).sum();

    Ok(ToolCallResult::json(&json!({
        "sector": params.sector.unwrap_or_else(|| "overall".to_string()),
        "listings": listings,
        "distribution": counts,
    })))
}
