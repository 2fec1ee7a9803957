//! `recommend_similar` tool: properties most similar to a given one.

use estate_explorer::SimilarityWeights;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::EstateSession;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::round_to;

#[derive(Debug, Deserialize)]
struct RecommendParams {
    property: String,
    #[serde(default = "default_top_n")]
    top_n: i64,
    #[serde(default)]
    weights: Option<WeightsParam>,
}

#[derive(Debug, Deserialize)]
struct WeightsParam {
    name: f64,
    location: f64,
    facilities: f64,
}

fn default_top_n() -> i64 {
    5
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "recommend_similar".to_string(),
        description: Some(
            "Rank other properties by weighted similarity of name, location advantages, \
             and facilities"
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "property": { "type": "string", "description": "Property name from estate://properties" },
                "top_n": { "type": "integer", "default": 5, "description": "Negative values return nothing" },
                "weights": {
                    "type": "object",
                    "description": "Override the server's similarity weights",
                    "properties": {
                        "name": { "type": "number", "minimum": 0 },
                        "location": { "type": "number", "minimum": 0 },
                        "facilities": { "type": "number", "minimum": 0 }
                    },
                    "required": ["name", "location", "facilities"]
                }
            },
            "required": ["property"]
        }),
    }
}

pub async fn execute(args: Value, session: &EstateSession) -> McpResult<ToolCallResult> {
    let params: RecommendParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let weights = params
        .weights
        .map(|w| SimilarityWeights::new(w.name, w.location, w.facilities))
        .transpose()?;
    let top_n = usize::try_from(params.top_n.max(0)).unwrap_or(usize::MAX);

    let recommendations = session.recommend(&params.property, top_n, weights)?;

    let results: Vec<Value> = recommendations
        .iter()
        .map(|r| {
            json!({
                "property": r.property,
                "score": round_to(r.score, 3),
            })
        })
        .collect();

    Ok(ToolCallResult::json(&json!({
        "property": params.property,
        "total": results.len(),
        "recommendations": results,
    })))
}
