//! `market_area_price` tool: built-up area vs price points for one property type.

use estate_explorer::PropertyType;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::EstateSession;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct AreaPriceParams {
    #[serde(default = "default_type")]
    property_type: String,
}

fn default_type() -> String {
    "flat".to_string()
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "market_area_price".to_string(),
        description: Some("Area (sq ft), price (crore) and bedrooms of listed properties".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "property_type": { "type": "string", "enum": ["flat", "house"], "default": "flat" }
            }
        }),
    }
}

pub async fn execute(args: Value, session: &EstateSession) -> McpResult<ToolCallResult> {
    let params: AreaPriceParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;
    let property_type: PropertyType = params.property_type.parse()?;

    let points = session.store().market()?.area_vs_price(property_type);

    Ok(ToolCallResult::json(&json!({
        "property_type": property_type,
        "total": points.len(),
        "points": points,
    })))
}
