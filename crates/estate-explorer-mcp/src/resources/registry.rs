//! Resource registration and dispatch.

use crate::session::EstateSession;
use crate::types::{
    McpError, McpResult, ReadResourceResult, ResourceDefinition, ResourceTemplateDefinition,
};

use super::templates::{
    DOMAINS_URI, LANDMARKS_URI, NEARBY_PREFIX, PROPERTIES_URI, SIMILAR_PREFIX, STATS_URI,
};
use super::{catalog, nearby, similar, stats, templates};

pub struct ResourceRegistry;

impl ResourceRegistry {
    pub fn list_templates() -> Vec<ResourceTemplateDefinition> {
        templates::list_templates()
    }

    pub fn list_resources() -> Vec<ResourceDefinition> {
        templates::list_resources()
    }

    pub async fn read(uri: &str, session: &EstateSession) -> McpResult<ReadResourceResult> {
        if let Some(property) = uri.strip_prefix(SIMILAR_PREFIX) {
            similar::read_similar(&percent_decode(property)?, session).await
        } else if let Some(rest) = uri.strip_prefix(NEARBY_PREFIX) {
            let (landmark, radius) = rest.rsplit_once('/').ok_or_else(|| {
                McpError::InvalidParams(
                    "Nearby URI must be estate://nearby/{landmark}/{radius_km}".to_string(),
                )
            })?;
            let radius_km: f64 = radius
                .parse()
                .map_err(|_| McpError::InvalidParams(format!("Invalid radius: {radius}")))?;
            nearby::read_nearby(&percent_decode(landmark)?, radius_km, session).await
        } else if uri == LANDMARKS_URI {
            catalog::read_landmarks(session).await
        } else if uri == PROPERTIES_URI {
            catalog::read_properties(session).await
        } else if uri == DOMAINS_URI {
            catalog::read_domains(session).await
        } else if uri == STATS_URI {
            stats::read_stats(session).await
        } else {
            Err(McpError::ResourceNotFound(uri.to_string()))
        }
    }
}

/// Decode `%XX` escapes in a URI segment. Names with spaces arrive as `%20`.
fn percent_decode(segment: &str) -> McpResult<String> {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = segment
                .get(i + 1..i + 3)
                .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| {
                    McpError::InvalidParams(format!("Bad percent escape in '{segment}'"))
                })?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out)
        .map_err(|_| McpError::InvalidParams(format!("'{segment}' is not valid UTF-8")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("Cyber%20Hub").unwrap(), "Cyber Hub");
        assert_eq!(percent_decode("DLF Phase 2").unwrap(), "DLF Phase 2");
        assert!(percent_decode("bad%2").is_err());
        assert!(percent_decode("bad%zz").is_err());
        assert!(percent_decode("bad%+1").is_err());
        assert!(percent_decode("bad%-1").is_err());
    }
}
