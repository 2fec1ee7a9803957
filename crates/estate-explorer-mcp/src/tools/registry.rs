//! Tool registration and dispatch.

use serde_json::Value;

use crate::session::EstateSession;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::{
    estimate_price, feature_terms, market_area_price, market_bhk, market_price_spread,
    market_sectors, recommend_similar, search_nearby,
};

pub struct ToolRegistry;

impl ToolRegistry {
    pub fn list_tools() -> Vec<ToolDefinition> {
        vec![
            estimate_price::definition(),
            search_nearby::definition(),
            recommend_similar::definition(),
            market_sectors::definition(),
            market_area_price::definition(),
            market_bhk::definition(),
            market_price_spread::definition(),
            feature_terms::definition(),
        ]
    }

    pub async fn call(
        name: &str,
        arguments: Option<Value>,
        session: &EstateSession,
    ) -> McpResult<ToolCallResult> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));
        tracing::debug!("tools/call {name}");

        match name {
            "estimate_price" => estimate_price::execute(args, session).await,
            "search_nearby" => search_nearby::execute(args, session).await,
            "recommend_similar" => recommend_similar::execute(args, session).await,
            "market_sectors" => market_sectors::execute(args, session).await,
            "market_area_price" => market_area_price::execute(args, session).await,
            "market_bhk" => market_bhk::execute(args, session).await,
            "market_price_spread" => market_price_spread::execute(args, session).await,
            "feature_terms" => feature_terms::execute(args, session).await,
            _ => Err(McpError::ToolNotFound(name.to_string())),
        }
    }
}
