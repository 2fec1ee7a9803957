//! Resource URI templates and static resource definitions.

use crate::types::{ResourceDefinition, ResourceTemplateDefinition};

pub const LANDMARKS_URI: &str = "estate://landmarks";
pub const PROPERTIES_URI: &str = "estate://properties";
pub const DOMAINS_URI: &str = "estate://domains";
pub const STATS_URI: &str = "estate://stats";
pub const SIMILAR_PREFIX: &str = "estate://similar/";
pub const NEARBY_PREFIX: &str = "estate://nearby/";

/// Results served by `estate://similar/{property}`.
pub const SIMILAR_TOP_N: usize = 5;

pub fn list_templates() -> Vec<ResourceTemplateDefinition> {
    vec![
        ResourceTemplateDefinition {
            uri_template: format!("{SIMILAR_PREFIX}{{property}}"),
            name: "Similar Properties".to_string(),
            description: Some(format!(
                "Top {SIMILAR_TOP_N} properties most similar to the named one"
            )),
            mime_type: Some("application/json".to_string()),
        },
        ResourceTemplateDefinition {
            uri_template: format!("{NEARBY_PREFIX}{{landmark}}/{{radius_km}}"),
            name: "Nearby Properties".to_string(),
            description: Some("Properties within a radius (km) of a landmark".to_string()),
            mime_type: Some("application/json".to_string()),
        },
    ]
}

pub fn list_resources() -> Vec<ResourceDefinition> {
    let json = |uri: &str, name: &str, description: &str| ResourceDefinition {
        uri: uri.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        mime_type: Some("application/json".to_string()),
    };
    vec![
        json(LANDMARKS_URI, "Landmarks", "Landmarks usable in search_nearby"),
        json(PROPERTIES_URI, "Properties", "Property names, alphabetical"),
        json(
            DOMAINS_URI,
            "Attribute Domains",
            "Accepted values for every estimate_price field",
        ),
        json(STATS_URI, "Dataset Statistics", "Counts of loaded artifacts"),
    ]
}
