//! Resource: estate://similar/{property}

use serde_json::json;

use crate::session::EstateSession;
use crate::tools::round_to;
use crate::types::{McpResult, ReadResourceResult, ResourceContent};

use super::templates::{SIMILAR_PREFIX, SIMILAR_TOP_N};

pub async fn read_similar(
    property: &str,
    session: &EstateSession,
) -> McpResult<ReadResourceResult> {
    let recommendations = session.recommend(property, SIMILAR_TOP_N, None)?;

    let matches: Vec<_> = recommendations
        .iter()
        .map(|r| json!({ "property": r.property, "score": round_to(r.score, 3) }))
        .collect();

    let content = json!({
        "property": property,
        "similar_count": matches.len(),
        "matches": matches,
    });

    Ok(ReadResourceResult {
        contents: vec![ResourceContent::json(
            &format!("{SIMILAR_PREFIX}{property}"),
            &content,
        )],
    })
}
