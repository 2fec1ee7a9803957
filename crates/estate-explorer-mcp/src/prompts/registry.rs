//! Prompt registration and dispatch.

use serde_json::Value;

use crate::types::{McpError, McpResult, PromptArgument, PromptDefinition, PromptGetResult};

use super::{market_brief, shortlist, valuation};

pub struct PromptRegistry;

fn argument(name: &str, description: &str, required: bool) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        description: Some(description.to_string()),
        required,
    }
}

impl PromptRegistry {
    pub fn list_prompts() -> Vec<PromptDefinition> {
        vec![
            PromptDefinition {
                name: "valuation".to_string(),
                description: Some("Guide for estimating a property's price".to_string()),
                arguments: Some(vec![
                    argument("property_type", "flat or house", false),
                    argument("sector", "Sector of the property", false),
                ]),
            },
            PromptDefinition {
                name: "shortlist".to_string(),
                description: Some(
                    "Guide for shortlisting properties near a landmark".to_string(),
                ),
                arguments: Some(vec![
                    argument("landmark", "Landmark name", true),
                    argument("radius_km", "Search radius in km (default 5)", false),
                ]),
            },
            PromptDefinition {
                name: "market_brief".to_string(),
                description: Some("Guide for summarising market data".to_string()),
                arguments: Some(vec![argument(
                    "sector",
                    "Sector to focus on (default: overall)",
                    false,
                )]),
            },
        ]
    }

    pub async fn get(name: &str, arguments: Option<Value>) -> McpResult<PromptGetResult> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            "valuation" => valuation::expand(args),
            "shortlist" => shortlist::expand(args),
            "market_brief" => market_brief::expand(args),
            _ => Err(McpError::PromptNotFound(name.to_string())),
        }
    }
}
