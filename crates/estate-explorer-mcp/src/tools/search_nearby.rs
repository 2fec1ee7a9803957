//! `search_nearby` tool: properties within a radius of a landmark.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::EstateSession;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::round_to;

#[derive(Debug, Deserialize)]
struct NearbyParams {
    landmark: String,
    radius_km: f64,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "search_nearby".to_string(),
        description: Some(
            "List properties strictly within radius_km of a landmark, nearest first".to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "landmark": { "type": "string", "description": "Landmark name from estate://landmarks" },
                "radius_km": { "type": "number", "minimum": 0 }
            },
            "required": ["landmark", "radius_km"]
        }),
    }
}

pub async fn execute(args: Value, session: &EstateSession) -> McpResult<ToolCallResult> {
    let params: NearbyParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let result = session.nearby(&params.landmark, params.radius_km)?;

    let neighbors: Vec<Value> = result
        .neighbors
        .iter()
        .map(|n| {
            json!({
                "property": n.property,
                "distance_m": n.distance_m,
                "distance_km": round_to(n.distance_km, 2),
            })
        })
        .collect();

    let mut body = json!({
        "landmark": result.landmark,
        "radius_km": result.radius_km,
        "found": !result.is_empty(),
        "total": neighbors.len(),
        "properties": neighbors,
    });
    if result.is_empty() {
        body["message"] = json!("No apartments found within the selected radius.");
    }

    Ok(ToolCallResult::json(&body))
}
