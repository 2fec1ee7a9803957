//! Radius search around a landmark.

use crate::index::PropertyIndex;
use crate::tables::DistanceTable;
use crate::types::{EstateError, EstateResult, NearbyResult, Neighbor};

/// Properties strictly closer than `radius_km` to `landmark`, nearest first.
///
/// Missing distances never match. Equal distances keep table row order.
pub fn search_nearby(
    index: &PropertyIndex,
    table: &DistanceTable,
    landmark: &str,
    radius_km: f64,
) -> EstateResult<NearbyResult> {
    let column = table
        .landmark_position(landmark)
        .ok_or_else(|| EstateError::InvalidInput(format!("Unknown landmark '{landmark}'")))?;

    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(EstateError::InvalidInput(format!(
            "radius_km must be a non-negative number, got {radius_km}"
        )));
    }
    let limit_m = radius_km * 1000.0;

    let mut hits: Vec<(usize, f64)> = table
        .column(column)
        .iter()
        .enumerate()
        .filter(|(_, d)| **d < limit_m)
        .map(|(i, d)| (i, *d))
        .collect();
    hits.sort_by(|a, b| a.1.total_cmp(&b.1));

    tracing::debug!(
        "Nearby '{landmark}' within {radius_km} km: {} properties",
        hits.len()
    );

    Ok(NearbyResult {
        landmark: landmark.to_string(),
        radius_km,
        neighbors: hits
            .into_iter()
            .map(|(i, meters)| Neighbor {
                property: index.name(i).to_string(),
                distance_m: meters,
                distance_km: meters / 1000.0,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::read_distance_csv;

    const DISTANCES: &str = "\
property_name,Cyber Hub,Airport
Gamma Towers,2500,800
Alpha Heights,500,
Beta Residency,1500,800
";

    #[test]
    fn test_cyber_hub_two_km() {
        let (index, table) = read_distance_csv(DISTANCES.as_bytes()).unwrap();
        let result = search_nearby(&index, &table, "Cyber Hub", 2.0).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.neighbors[0].property, "Alpha Heights");
        assert_eq!(result.neighbors[0].distance_m, 500.0);
        assert_eq!(result.neighbors[0].distance_km, 0.5);
        assert_eq!(result.neighbors[1].property, "Beta Residency");
        assert_eq!(result.neighbors[1].distance_m, 1500.0);
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let (index, table) = read_distance_csv(DISTANCES.as_bytes()).unwrap();
        let result = search_nearby(&index, &table, "Cyber Hub", 1.5).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_empty_result_is_not_error() {
        let (index, table) = read_distance_csv(DISTANCES.as_bytes()).unwrap();
        let result = search_nearby(&index, &table, "Cyber Hub", 0.1).unwrap();
        assert!(result.is_empty());
        let result = search_nearby(&index, &table, "Cyber Hub", 0.0).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_missing_distance_never_matches_and_ties_are_stable() {
        let (index, table) = read_distance_csv(DISTANCES.as_bytes()).unwrap();
        let result = search_nearby(&index, &table, "Airport", 100.0).unwrap();
        let names: Vec<&str> = result.neighbors.iter().map(|n| n.property.as_str()).collect();
        assert_eq!(names, vec!["Gamma Towers", "Beta Residency"]);
    }

    #[test]
    fn test_invalid_landmark_and_radius() {
        let (index, table) = read_distance_csv(DISTANCES.as_bytes()).unwrap();
        assert!(search_nearby(&index, &table, "Mars", 5.0)
            .unwrap_err()
            .is_invalid_input());
        assert!(search_nearby(&index, &table, "Cyber Hub", -1.0).is_err());
        assert!(search_nearby(&index, &table, "Cyber Hub", f64::NAN).is_err());
    }
}
