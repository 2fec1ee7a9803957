//! Training-time attribute domains and validated pipeline input.
//!
//! The regression pipeline's encoder only knows the categories it saw during
//! training, so every query is checked against those categories here, before
//! the pipeline is ever invoked.

use std::collections::BTreeSet;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::types::{EstateError, EstateResult, PropertyType};

/// Pipeline input columns, in the exact order and spelling the model was trained with.
pub const PIPELINE_COLUMNS: [&str; 12] = [
    "property_type",
    "sector",
    "bedRoom",
    "bathroom",
    "balcony",
    "agePossession",
    "built_up_area",
    "servant room",
    "store room",
    "furnishing_type",
    "luxury_category",
    "floor_category",
];

/// Smallest built-up area (sq ft) accepted for an estimate.
pub const MIN_BUILT_UP_AREA: f64 = 300.0;

/// One property, as entered by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuery {
    pub property_type: String,
    pub sector: String,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub balcony: String,
    pub age_possession: String,
    pub built_up_area: f64,
    #[serde(default)]
    pub servant_room: bool,
    #[serde(default)]
    pub store_room: bool,
    pub furnishing_type: String,
    pub luxury_category: String,
    pub floor_category: String,
}

/// A query whose every categorical field is known to the pipeline.
///
/// Only [`AttributeDomains::validate`] constructs this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedAttributes {
    property_type: PropertyType,
    sector: String,
    bedrooms: f64,
    bathrooms: f64,
    balcony: String,
    age_possession: String,
    built_up_area: f64,
    servant_room: bool,
    store_room: bool,
    furnishing_type: String,
    luxury_category: String,
    floor_category: String,
}

impl ValidatedAttributes {
    pub fn property_type(&self) -> PropertyType {
        self.property_type
    }

    pub fn sector(&self) -> &str {
        &self.sector
    }

    /// Pipeline input in [`PIPELINE_COLUMNS`] order.
    pub fn feature_row(&self) -> FeatureRow {
        let flag = |b: bool| FeatureValue::Number(if b { 1.0 } else { 0.0 });
        let values = [
            FeatureValue::Text(self.property_type.as_str().to_string()),
            FeatureValue::Text(self.sector.clone()),
            FeatureValue::Number(self.bedrooms),
            FeatureValue::Number(self.bathrooms),
            FeatureValue::Text(self.balcony.clone()),
            FeatureValue::Text(self.age_possession.clone()),
            FeatureValue::Number(self.built_up_area),
            flag(self.servant_room),
            flag(self.store_room),
            FeatureValue::Text(self.furnishing_type.clone()),
            FeatureValue::Text(self.luxury_category.clone()),
            FeatureValue::Text(self.floor_category.clone()),
        ];
        FeatureRow {
            cells: PIPELINE_COLUMNS.iter().copied().zip(values).collect(),
        }
    }
}

/// A single pipeline input value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Text(String),
    Number(f64),
}

/// Named, ordered pipeline input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    cells: Vec<(&'static str, FeatureValue)>,
}

impl FeatureRow {
    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, FeatureValue)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.cells.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }
}

/// Sorted, de-duplicated numeric category values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericDomain(Vec<f64>);

impl NumericDomain {
    fn insert(&mut self, value: f64) {
        if !self.contains(value) {
            self.0.push(value);
            self.0.sort_by(f64::total_cmp);
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.0.iter().any(|v| (v - value).abs() < 1e-9)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-field allowed values, taken from the reference listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeDomains {
    pub sectors: BTreeSet<String>,
    pub bedrooms: NumericDomain,
    pub bathrooms: NumericDomain,
    pub balconies: BTreeSet<String>,
    pub age_possession: BTreeSet<String>,
    pub furnishing_types: BTreeSet<String>,
    pub luxury_categories: BTreeSet<String>,
    pub floor_categories: BTreeSet<String>,
}

impl AttributeDomains {
    /// Collect domains from `reference.csv`. Extra columns are ignored.
    pub fn from_reference_csv<R: Read>(reader: R) -> EstateResult<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| EstateError::ArtifactLoad(format!("reference data: {e}")))?
            .clone();

        let column = |name: &str| -> EstateResult<usize> {
            headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
                EstateError::ArtifactLoad(format!("reference data: missing column '{name}'"))
            })
        };

        let sector = column("sector")?;
        let bedrooms = column("bedRoom")?;
        let bathrooms = column("bathroom")?;
        let balcony = column("balcony")?;
        let age = column("agePossession")?;
        let furnishing = column("furnishing_type")?;
        let luxury = column("luxury_category")?;
        let floor = column("floor_category")?;

        let mut domains = AttributeDomains::default();
        for (row, record) in rdr.records().enumerate() {
            let record =
                record.map_err(|e| EstateError::ArtifactLoad(format!("reference data: {e}")))?;
            let text = |i: usize| record.get(i).map(str::trim).unwrap_or("");
            let number = |i: usize, name: &str| -> EstateResult<f64> {
                text(i).parse::<f64>().map_err(|_| {
                    EstateError::ArtifactLoad(format!(
                        "reference data: invalid {name} '{}' at row {row}",
                        text(i)
                    ))
                })
            };

            insert_text(&mut domains.sectors, text(sector));
            domains.bedrooms.insert(number(bedrooms, "bedRoom")?);
            domains.bathrooms.insert(number(bathrooms, "bathroom")?);
            insert_text(&mut domains.balconies, text(balcony));
            insert_text(&mut domains.age_possession, text(age));
            insert_text(&mut domains.furnishing_types, text(furnishing));
            insert_text(&mut domains.luxury_categories, text(luxury));
            insert_text(&mut domains.floor_categories, text(floor));
        }

        domains.ensure_populated()?;
        tracing::debug!(
            "Attribute domains: {} sectors, {} bedroom values",
            domains.sectors.len(),
            domains.bedrooms.values().len()
        );
        Ok(domains)
    }

    fn ensure_populated(&self) -> EstateResult<()> {
        let empty = [
            ("sector", self.sectors.is_empty()),
            ("bedRoom", self.bedrooms.is_empty()),
            ("bathroom", self.bathrooms.is_empty()),
            ("balcony", self.balconies.is_empty()),
            ("agePossession", self.age_possession.is_empty()),
            ("furnishing_type", self.furnishing_types.is_empty()),
            ("luxury_category", self.luxury_categories.is_empty()),
            ("floor_category", self.floor_categories.is_empty()),
        ];
        match empty.iter().find(|(_, is_empty)| *is_empty) {
            Some((field, _)) => Err(EstateError::ArtifactLoad(format!(
                "reference data has no values for '{field}'"
            ))),
            None => Ok(()),
        }
    }

    /// Check a query against the domains and area bound.
    pub fn validate(&self, query: &PriceQuery) -> EstateResult<ValidatedAttributes> {
        let property_type: PropertyType = query.property_type.parse()?;

        if !query.built_up_area.is_finite() || query.built_up_area < MIN_BUILT_UP_AREA {
            return Err(EstateError::InvalidInput(format!(
                "built_up_area must be at least {MIN_BUILT_UP_AREA} sq ft, got {}",
                query.built_up_area
            )));
        }

        Ok(ValidatedAttributes {
            property_type,
            sector: check_text("sector", &query.sector, &self.sectors)?,
            bedrooms: check_number("bedRoom", query.bedrooms, &self.bedrooms)?,
            bathrooms: check_number("bathroom", query.bathrooms, &self.bathrooms)?,
            balcony: check_text("balcony", &query.balcony, &self.balconies)?,
            age_possession: check_text("agePossession", &query.age_possession, &self.age_possession)?,
            built_up_area: query.built_up_area,
            servant_room: query.servant_room,
            store_room: query.store_room,
            furnishing_type: check_text(
                "furnishing_type",
                &query.furnishing_type,
                &self.furnishing_types,
            )?,
            luxury_category: check_text(
                "luxury_category",
                &query.luxury_category,
                &self.luxury_categories,
            )?,
            floor_category: check_text(
                "floor_category",
                &query.floor_category,
                &self.floor_categories,
            )?,
        })
    }
}

fn insert_text(set: &mut BTreeSet<String>, value: &str) {
    if !value.is_empty() {
        set.insert(value.to_string());
    }
}

fn check_text(field: &str, value: &str, domain: &BTreeSet<String>) -> EstateResult<String> {
    let value = value.trim();
    if domain.contains(value) {
        Ok(value.to_string())
    } else {
        Err(EstateError::InvalidInput(format!(
            "Unknown {field} '{value}'"
        )))
    }
}

fn check_number(field: &str, value: f64, domain: &NumericDomain) -> EstateResult<f64> {
    if value.is_finite() && domain.contains(value) {
        Ok(value)
    } else {
        Err(EstateError::InvalidInput(format!(
            "Unknown {field} value {value}"
        )))
    }
}
