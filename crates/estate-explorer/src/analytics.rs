//! Market analytics over the visualization listings.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::types::{EstateError, EstateResult, PropertyType};

/// Tokens dropped from the feature text.
pub const FEATURE_STOPWORDS: [&str; 1] = ["s"];

/// One row of `data_viz.csv`. Extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketListing {
    pub property_type: String,
    pub sector: String,
    pub price: f64,
    pub price_per_sqft: f64,
    pub built_up_area: f64,
    #[serde(rename = "bedRoom")]
    pub bedrooms: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl MarketListing {
    fn numeric_fields(&self) -> [(&'static str, f64); 6] {
        [
            ("price", self.price),
            ("price_per_sqft", self.price_per_sqft),
            ("built_up_area", self.built_up_area),
            ("bedRoom", self.bedrooms),
            ("latitude", self.latitude),
            ("longitude", self.longitude),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSummary {
    pub sector: String,
    pub listings: usize,
    pub mean_price: f64,
    pub mean_price_per_sqft: f64,
    pub mean_built_up_area: f64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaPricePoint {
    pub built_up_area: f64,
    pub price: f64,
    pub bedrooms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BhkCount {
    pub bedrooms: f64,
    pub count: usize,
}

/// Min, quartiles, and max.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    /// `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Linear-interpolated quantile of an already sorted, non-empty slice.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BhkPriceSpread {
    pub bedrooms: f64,
    pub count: usize,
    pub price: FiveNumberSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceDistribution {
    pub property_type: PropertyType,
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub price: FiveNumberSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

/// Listings behind the analytics views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketDataset {
    listings: Vec<MarketListing>,
}

impl MarketDataset {
    /// Every numeric field must be finite; NaN or infinite cells are rejected.
    pub fn new(listings: Vec<MarketListing>) -> EstateResult<Self> {
        for (row, listing) in listings.iter().enumerate() {
            if let Some((column, value)) = listing
                .numeric_fields()
                .into_iter()
                .find(|(_, v)| !v.is_finite())
            {
                return Err(EstateError::ArtifactLoad(format!(
                    "listing {} ({}): '{column}' is {value}",
                    row + 1,
                    listing.sector
                )));
            }
        }
        Ok(Self { listings })
    }

    pub fn from_csv<R: Read>(reader: R) -> EstateResult<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut listings = Vec::new();
        for row in rdr.deserialize() {
            let listing: MarketListing = row?;
            listings.push(listing);
        }
        tracing::debug!("Market dataset: {} listings", listings.len());
        Self::new(listings)
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Per-sector means, sorted by sector name.
    pub fn sector_summary(&self) -> Vec<SectorSummary> {
        let mut groups: BTreeMap<&str, Vec<&MarketListing>> = BTreeMap::new();
        for listing in &self.listings {
            groups.entry(&listing.sector).or_default().push(listing);
        }

        groups
            .into_iter()
            .map(|(sector, rows)| {
                let mean = |f: fn(&MarketListing) -> f64| {
                    rows.iter().map(|l| f(l)).sum::<f64>() / rows.len() as f64
                };
                SectorSummary {
                    sector: sector.to_string(),
                    listings: rows.len(),
                    mean_price: mean(|l| l.price),
                    mean_price_per_sqft: mean(|l| l.price_per_sqft),
                    mean_built_up_area: mean(|l| l.built_up_area),
                    latitude: mean(|l| l.latitude),
                    longitude: mean(|l| l.longitude),
                }
            })
            .collect()
    }

    pub fn area_vs_price(&self, property_type: PropertyType) -> Vec<AreaPricePoint> {
        self.of_type(property_type)
            .map(|l| AreaPricePoint {
                built_up_area: l.built_up_area,
                price: l.price,
                bedrooms: l.bedrooms,
            })
            .collect()
    }

    /// Listing count per bedroom count. `None` or `"overall"` covers every sector.
    pub fn bhk_distribution(&self, sector: Option<&str>) -> EstateResult<Vec<BhkCount>> {
        let sector = sector.filter(|s| !s.eq_ignore_ascii_case("overall"));
        if let Some(s) = sector {
            if !self.listings.iter().any(|l| l.sector == s) {
                return Err(EstateError::InvalidInput(format!("Unknown sector '{s}'")));
            }
        }

        let mut bedrooms: Vec<f64> = self
            .listings
            .iter()
            .filter(|l| sector.map_or(true, |s| l.sector == s))
            .map(|l| l.bedrooms)
            .collect();
        bedrooms.sort_by(f64::total_cmp);

        let mut counts: Vec<BhkCount> = Vec::new();
        for b in bedrooms {
            match counts.last_mut() {
                Some(last) if last.bedrooms.total_cmp(&b) == Ordering::Equal => last.count += 1,
                _ => counts.push(BhkCount {
                    bedrooms: b,
                    count: 1,
                }),
            }
        }
        Ok(counts)
    }

    /// Price spread per bedroom count, for counts up to `max_bedrooms`.
    pub fn bhk_price_spread(&self, max_bedrooms: f64) -> Vec<BhkPriceSpread> {
        let mut groups: Vec<(f64, Vec<f64>)> = Vec::new();
        let mut rows: Vec<&MarketListing> = self
            .listings
            .iter()
            .filter(|l| l.bedrooms <= max_bedrooms)
            .collect();
        rows.sort_by(|a, b| a.bedrooms.total_cmp(&b.bedrooms));

        for l in rows {
            match groups.last_mut() {
                Some((b, prices)) if b.total_cmp(&l.bedrooms) == Ordering::Equal => {
                    prices.push(l.price)
                }
                _ => groups.push((l.bedrooms, vec![l.price])),
            }
        }

        groups
            .into_iter()
            .filter_map(|(bedrooms, prices)| {
                FiveNumberSummary::from_values(&prices).map(|price| BhkPriceSpread {
                    bedrooms,
                    count: prices.len(),
                    price,
                })
            })
            .collect()
    }

    /// Price statistics per property type. Types without listings are omitted.
    pub fn price_distribution(&self) -> Vec<PriceDistribution> {
        PropertyType::ALL
            .iter()
            .filter_map(|&t| {
                let prices: Vec<f64> = self.of_type(t).map(|l| l.price).collect();
                let price = FiveNumberSummary::from_values(&prices)?;
                let n = prices.len() as f64;
                let mean = prices.iter().sum::<f64>() / n;
                let std_dev = if prices.len() > 1 {
                    (prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
                } else {
                    0.0
                };
                Some(PriceDistribution {
                    property_type: t,
                    count: prices.len(),
                    mean,
                    std_dev,
                    price,
                })
            })
            .collect()
    }

    fn of_type(&self, property_type: PropertyType) -> impl Iterator<Item = &MarketListing> {
        self.listings
            .iter()
            .filter(move |l| l.property_type.eq_ignore_ascii_case(property_type.as_str()))
    }
}

/// Most frequent terms in the amenity text, most common first, then alphabetical.
pub fn feature_terms(text: &str, top_k: usize) -> Vec<TermCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
    {
        let term = token.to_lowercase();
        if FEATURE_STOPWORDS.contains(&term.as_str()) {
            continue;
        }
        *counts.entry(term).or_insert(0) += 1;
    }

    let mut terms: Vec<TermCount> = counts
        .into_iter()
        .map(|(term, count)| TermCount { term, count })
        .collect();
    terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
    terms.truncate(top_k);
    terms
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const MARKET: &str = "\
property_type,sector,price,price_per_sqft,built_up_area,bedRoom,latitude,longitude,extra
flat,sector 45,1.0,10000,1000,2,28.40,77.00,x
flat,sector 45,2.0,12000,1600,3,28.42,77.02,x
house,sector 45,4.0,20000,2000,4,28.44,77.04,x
flat,sector 65,3.0,15000,2000,3,28.50,77.10,x
house,sector 65,6.0,25000,2400,5,28.52,77.12,x
";

    fn dataset() -> MarketDataset {
        MarketDataset::from_csv(MARKET.as_bytes()).unwrap()
    }

    #[test]
    fn test_sector_summary_means() {
        let summary = dataset().sector_summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].sector, "sector 45");
        assert_eq!(summary[0].listings, 3);
        assert!((summary[0].mean_price - 7.0 / 3.0).abs() < 1e-9);
        assert!((summary[0].latitude - 28.42).abs() < 1e-9);
        assert!((summary[1].mean_built_up_area - 2200.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_vs_price_filters_type() {
        let points = dataset().area_vs_price(PropertyType::House);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.price >= 4.0));
    }

    #[test]
    fn test_bhk_distribution() {
        let ds = dataset();
        let overall = ds.bhk_distribution(None).unwrap();
        assert_eq!(
            overall,
            vec![
                BhkCount { bedrooms: 2.0, count: 1 },
                BhkCount { bedrooms: 3.0, count: 2 },
                BhkCount { bedrooms: 4.0, count: 1 },
                BhkCount { bedrooms: 5.0, count: 1 },
            ]
        );
        assert_eq!(ds.bhk_distribution(Some("overall")).unwrap(), overall);
        assert_eq!(ds.bhk_distribution(Some("sector 65")).unwrap().len(), 2);
        assert!(ds
            .bhk_distribution(Some("sector 999"))
            .unwrap_err()
            .is_invalid_input());
    }

    #[test]
    fn test_quantiles_are_linear() {
        let s = FiveNumberSummary::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.min, 1.0);
        assert!((s.q1 - 1.75).abs() < 1e-12);
        assert!((s.median - 2.5).abs() < 1e-12);
        assert!((s.q3 - 3.25).abs() < 1e-12);
        assert_eq!(s.max, 4.0);
        assert!(FiveNumberSummary::from_values(&[]).is_none());
    }

    #[test]
    fn test_bhk_price_spread_caps_bedrooms() {
        let spread = dataset().bhk_price_spread(4.0);
        let beds: Vec<f64> = spread.iter().map(|s| s.bedrooms).collect();
        assert_eq!(beds, vec![2.0, 3.0, 4.0]);
        assert_eq!(spread[1].count, 2);
        assert!((spread[1].price.median - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_price_distribution() {
        let dist = dataset().price_distribution();
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].property_type, PropertyType::Flat);
        assert_eq!(dist[0].count, 3);
        assert!((dist[0].mean - 2.0).abs() < 1e-12);
        assert!((dist[0].std_dev - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_corrupt_market_csv() {
        let bad = "property_type,sector,price\nflat,sector 1,cheap\n";
        assert!(MarketDataset::from_csv(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_non_finite_market_value_rejected() {
        let csv = MARKET.replacen("28.40", "NaN", 1);
        let err = MarketDataset::from_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, EstateError::ArtifactLoad(ref m) if m.contains("latitude")));
    }

    #[test]
    fn test_feature_terms() {
        let terms = feature_terms("Gym, Pool's gym; CLUB house pool gym", 3);
        assert_eq!(terms[0], TermCount { term: "gym".into(), count: 3 });
        assert_eq!(terms[1], TermCount { term: "pool".into(), count: 2 });
        assert_eq!(terms[2], TermCount { term: "club".into(), count: 1 });
        assert!(feature_terms("s s s", 10).is_empty());
    }
}
