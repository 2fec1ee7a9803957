//! Resource: estate://nearby/{landmark}/{radius_km}

use serde_json::json;

use crate::session::EstateSession;
use crate::tools::round_to;
use crate::types::{McpResult, ReadResourceResult, ResourceContent};

use super::templates::NEARBY_PREFIX;

pub async fn read_nearby(
    landmark: &str,
    radius_km: f64,
    session: &EstateSession,
) -> McpResult<ReadResourceResult> {
    let result = session.nearby(landmark, radius_km)?;

    let properties: Vec<_> = result
        .neighbors
        .iter()
        .map(|n| json!({ "property": n.property, "distance_km": round_to(n.distance_km, 2) }))
        .collect();

    let content = json!({
        "landmark": landmark,
        "radius_km": radius_km,
        "found": !result.is_empty(),
        "properties": properties,
    });

    Ok(ReadResourceResult {
        contents: vec![ResourceContent::json(
            &format!("{NEARBY_PREFIX}{landmark}/{radius_km}"),
            &content,
        )],
    })
}
