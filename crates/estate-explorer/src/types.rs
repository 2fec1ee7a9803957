//! Core data types for price estimates, neighbor searches, and recommendations.

use serde::{Deserialize, Serialize};

/// Absolute width (in crore) added on each side of a point estimate.
pub const DEFAULT_PRICE_MARGIN: f64 = 0.22;

/// Property type as seen by the regression pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Flat,
    House,
}

impl PropertyType {
    pub const ALL: [PropertyType; 2] = [PropertyType::Flat, PropertyType::House];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Flat => "flat",
            PropertyType::House => "house",
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PropertyType {
    type Err = EstateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(PropertyType::Flat),
            "house" => Ok(PropertyType::House),
            other => Err(EstateError::InvalidInput(format!(
                "Unknown property_type '{other}' (expected 'flat' or 'house')"
            ))),
        }
    }
}

/// Low / expected / high price, in crore.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub low: f64,
    pub expected: f64,
    pub high: f64,
}

/// Symmetric, fixed-width band around a point estimate.
///
/// The default margin of 0.22 crore is a policy constant carried over from
/// the deployed estimator. It is not derived from model error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub margin: f64,
}

impl Default for PriceBand {
    fn default() -> Self {
        Self {
            margin: DEFAULT_PRICE_MARGIN,
        }
    }
}

impl PriceBand {
    pub fn new(margin: f64) -> EstateResult<Self> {
        if !margin.is_finite() || margin < 0.0 {
            return Err(EstateError::InvalidInput(format!(
                "Price margin must be a non-negative number, got {margin}"
            )));
        }
        Ok(Self { margin })
    }

    /// Build the range around an expected price.
    pub fn apply(&self, expected: f64) -> PriceEstimate {
        PriceEstimate {
            low: expected - self.margin,
            expected,
            high: expected + self.margin,
        }
    }
}

/// Weights applied to the three similarity matrices.
///
/// Defaults (0.5 / 0.8 / 1.0) match the deployed recommender and are
/// a tunable policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    /// Weight of the property-name similarity.
    pub name: f64,
    /// Weight of the location-advantage similarity.
    pub location: f64,
    /// Weight of the facilities / price-detail similarity.
    pub facilities: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            name: 0.5,
            location: 0.8,
            facilities: 1.0,
        }
    }
}

impl SimilarityWeights {
    pub fn new(name: f64, location: f64, facilities: f64) -> EstateResult<Self> {
        let weights = Self {
            name,
            location,
            facilities,
        };
        weights.validate()?;
        Ok(weights)
    }

    /// Reject negative or non-finite weights.
    pub fn validate(&self) -> EstateResult<()> {
        for (label, w) in [
            ("name", self.name),
            ("location", self.location),
            ("facilities", self.facilities),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(EstateError::InvalidInput(format!(
                    "Similarity weight '{label}' must be a non-negative number, got {w}"
                )));
            }
        }
        Ok(())
    }

    /// Combine one entry from each matrix.
    #[inline]
    pub fn combine(&self, name: f64, location: f64, facilities: f64) -> f64 {
        self.name * name + self.location * location + self.facilities * facilities
    }
}

impl std::str::FromStr for SimilarityWeights {
    type Err = EstateError;

    /// Parse `"w1,w2,w3"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(EstateError::InvalidInput(format!(
                "Expected three comma-separated weights, got '{s}'"
            )));
        }
        let mut values = [0.0f64; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                EstateError::InvalidInput(format!("Invalid weight '{part}' in '{s}'"))
            })?;
        }
        Self::new(values[0], values[1], values[2])
    }
}

/// A property found within a radius of a landmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub property: String,
    pub distance_m: f64,
    pub distance_km: f64,
}

/// Outcome of a radius search. An empty list is a valid "no matches" answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyResult {
    pub landmark: String,
    pub radius_km: f64,
    pub neighbors: Vec<Neighbor>,
}

impl NearbyResult {
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }
}

/// A property recommended as similar to a query property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub property: String,
    pub score: f64,
}

/// Errors that can occur in the estate library.
#[derive(thiserror::Error, Debug)]
pub enum EstateError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Artifact load failure: {0}")]
    ArtifactLoad(String),

    #[error("Artifact not available: {0}")]
    ArtifactMissing(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl EstateError {
    /// True for errors caused by the caller's input rather than by the data.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, EstateError::InvalidInput(_))
    }
}

/// Convenience result type.
pub type EstateResult<T> = Result<T, EstateError>;
