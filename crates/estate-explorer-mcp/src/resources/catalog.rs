//! Resources: estate://landmarks, estate://properties, estate://domains

use serde_json::json;

use estate_explorer::domain::MIN_BUILT_UP_AREA;
use estate_explorer::PropertyType;

use crate::session::EstateSession;
use crate::types::{McpResult, ReadResourceResult, ResourceContent};

use super::templates::{DOMAINS_URI, LANDMARKS_URI, PROPERTIES_URI};

pub async fn read_landmarks(session: &EstateSession) -> McpResult<ReadResourceResult> {
    let landmarks = session.store().landmarks();
    let content = json!({
        "count": landmarks.len(),
        "landmarks": landmarks,
    });
    Ok(ReadResourceResult {
        contents: vec![ResourceContent::json(LANDMARKS_URI, &content)],
    })
}

pub async fn read_properties(session: &EstateSession) -> McpResult<ReadResourceResult> {
    let names = session.store().index().sorted_names();
    let content = json!({
        "count": names.len(),
        "properties": names,
    });
    Ok(ReadResourceResult {
        contents: vec![ResourceContent::json(PROPERTIES_URI, &content)],
    })
}

pub async fn read_domains(session: &EstateSession) -> McpResult<ReadResourceResult> {
    let d = session.store().domains();
    let content = json!({
        "property_type": PropertyType::ALL,
        "sector": d.sectors,
        "bedrooms": d.bedrooms.values(),
        "bathrooms": d.bathrooms.values(),
        "balcony": d.balconies,
        "age_possession": d.age_possession,
        "built_up_area": { "min": MIN_BUILT_UP_AREA },
        "servant_room": [false, true],
        "store_room": [false, true],
        "furnishing_type": d.furnishing_types,
        "luxury_category": d.luxury_categories,
        "floor_category": d.floor_categories,
    });
    Ok(ReadResourceResult {
        contents: vec![ResourceContent::json(DOMAINS_URI, &content)],
    })
}
