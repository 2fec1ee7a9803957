//! Resource: estate://stats

use serde_json::json;

use crate::session::EstateSession;
use crate::types::{McpResult, ReadResourceResult, ResourceContent};

use super::templates::STATS_URI;

pub async fn read_stats(session: &EstateSession) -> McpResult<ReadResourceResult> {
    let stats = session.store().stats();
    let weights = session.weights();

    let content = json!({
        "properties": stats.properties,
        "landmarks": stats.landmarks,
        "sectors": stats.sectors,
        "market_listings": stats.market_listings,
        "feature_text": stats.feature_text,
        "model": session.pipeline().describe(),
        "source": session.source().map(|p| p.display().to_string()),
        "weights": weights,
        "price_margin": session.band().margin,
    });

    Ok(ReadResourceResult {
        contents: vec![ResourceContent::json(STATS_URI, &content)],
    })
}
