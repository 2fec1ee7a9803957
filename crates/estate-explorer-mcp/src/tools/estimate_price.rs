//! `estimate_price` tool: price range for a described property.

use estate_explorer::PriceQuery;
use serde_json::{json, Value};

use crate::session::EstateSession;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::round_to;

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "estimate_price".to_string(),
        description: Some(
            "Estimate the price (in crore) of a flat or house from its attributes. \
             Categorical values must match estate://domains."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "property_type": { "type": "string", "enum": ["flat", "house"] },
                "sector": { "type": "string" },
                "bedrooms": { "type": "number" },
                "bathrooms": { "type": "number" },
                "balcony": { "type": "string", "description": "Balcony bucket, e.g. \"3+\"" },
                "age_possession": { "type": "string", "description": "e.g. \"New Property\"" },
                "built_up_area": { "type": "number", "minimum": 300, "description": "Square feet" },
                "servant_room": { "type": "boolean", "default": false },
                "store_room": { "type": "boolean", "default": false },
                "furnishing_type": { "type": "string" },
                "luxury_category": { "type": "string" },
                "floor_category": { "type": "string" }
            },
            "required": [
                "property_type", "sector", "bedrooms", "bathrooms", "balcony",
                "age_possession", "built_up_area", "furnishing_type",
                "luxury_category", "floor_category"
            ]
        }),
    }
}

pub async fn execute(args: Value, session: &EstateSession) -> McpResult<ToolCallResult> {
    let query: PriceQuery =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let estimate = session.estimate(&query)?;

    Ok(ToolCallResult::json(&json!({
        "low": estimate.low,
        "expected": estimate.expected,
        "high": estimate.high,
        "unit": "crore",
        "summary": format!(
            "The price of the {} is between {:.2} Cr and {:.2} Cr (expected {:.2} Cr)",
            query.property_type.trim().to_ascii_lowercase(),
            round_to(estimate.low, 2),
            round_to(estimate.high, 2),
            round_to(estimate.expected, 2)
        ),
    })))
}
