//! `market_price_spread` tool: price spread per bedroom count and per property type.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::EstateSession;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct SpreadParams {
    #[serde(default = "default_max_bedrooms")]
    max_bedrooms: f64,
}

fn default_max_bedrooms() -> f64 {
    4.0
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "market_price_spread".to_string(),
        description: Some(
            "Five-number price summaries by bedroom count, plus price distribution \
             by property type"
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "max_bedrooms": { "type": "number", "default": 4 }
            }
        }),
    }
}

pub async fn execute(args: Value, session: &EstateSession) -> McpResult<ToolCallResult> {
    let params: SpreadParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;
    if !params.max_bedrooms.is_finite() {
        return Err(McpError::InvalidParams(
            "max_bedrooms must be a finite number".to_string(),
        ));
    }

    let market = session.store().market()?;

    Ok(ToolCallResult::json(&json!({
        "by_bedrooms": market.bhk_price_spread(params.max_bedrooms),
        "by_property_type": market.price_distribution(),
    })))
}
