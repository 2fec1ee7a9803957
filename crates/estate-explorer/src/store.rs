//! The immutable artifact store every query runs against.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Serialize;

use crate::analytics::MarketDataset;
use crate::domain::{AttributeDomains, PriceQuery};
use crate::estimator::estimate_price;
use crate::index::PropertyIndex;
use crate::nearby::search_nearby;
use crate::pipeline::PricePipeline;
use crate::similarity::recommend_similar;
use crate::storage::EstateReader;
use crate::tables::{read_distance_csv, read_similarity_csv, DistanceTable, SimilarityMatrices};
use crate::types::{
    EstateError, EstateResult, NearbyResult, PriceBand, PriceEstimate, Recommendation,
    SimilarityWeights,
};

pub const REFERENCE_FILE: &str = "reference.csv";
pub const DISTANCE_FILE: &str = "location_distance.csv";
pub const SIMILARITY_FILES: [&str; 3] = ["cosine_sim1.csv", "cosine_sim2.csv", "cosine_sim3.csv"];
pub const MARKET_FILE: &str = "data_viz.csv";
pub const FEATURE_TEXT_FILE: &str = "feature_text.txt";
pub const BUNDLE_EXTENSION: &str = "estate";

/// Property index, distance table, similarity matrices and attribute domains,
/// all aligned on the same canonical property order.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactStore {
    index: PropertyIndex,
    distances: DistanceTable,
    similarity: SimilarityMatrices,
    domains: AttributeDomains,
    market: Option<MarketDataset>,
    feature_text: Option<String>,
}

/// Counts reported by `info` and `estate://stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub properties: usize,
    pub landmarks: usize,
    pub sectors: usize,
    pub market_listings: Option<usize>,
    pub feature_text: bool,
}

impl ArtifactStore {
    /// Assemble a store, checking that every table has one row per property.
    pub fn new(
        index: PropertyIndex,
        distances: DistanceTable,
        similarity: SimilarityMatrices,
        domains: AttributeDomains,
    ) -> EstateResult<Self> {
        if distances.rows() != index.len() {
            return Err(EstateError::ArtifactLoad(format!(
                "Distance table has {} rows for {} properties",
                distances.rows(),
                index.len()
            )));
        }
        if similarity.size() != index.len() {
            return Err(EstateError::ArtifactLoad(format!(
                "Similarity matrices are {0}x{0} for {1} properties",
                similarity.size(),
                index.len()
            )));
        }
        Ok(Self {
            index,
            distances,
            similarity,
            domains,
            market: None,
            feature_text: None,
        })
    }

    pub fn with_market(mut self, market: MarketDataset) -> Self {
        self.market = Some(market);
        self
    }

    pub fn with_feature_text(mut self, text: impl Into<String>) -> Self {
        self.feature_text = Some(text.into());
        self
    }

    /// Load from a data directory or a packed `.estate` bundle.
    pub fn load(path: &Path) -> EstateResult<Self> {
        if path.is_file() {
            tracing::info!("Loading bundle {}", path.display());
            let store = EstateReader::read_from_file(path)?;
            store.log_loaded();
            Ok(store)
        } else {
            Self::load_dir(path)
        }
    }

    /// Load the CSV artifact set from `dir`.
    pub fn load_dir(dir: &Path) -> EstateResult<Self> {
        if !dir.is_dir() {
            return Err(EstateError::ArtifactLoad(format!(
                "Data directory not found: {}",
                dir.display()
            )));
        }
        tracing::info!("Loading artifacts from {}", dir.display());

        let (index, distances) = read_distance_csv(open_required(dir, DISTANCE_FILE)?)?;

        let mut matrices = Vec::with_capacity(SIMILARITY_FILES.len());
        for file in SIMILARITY_FILES {
            matrices.push(read_similarity_csv(open_required(dir, file)?, &index, file)?);
        }
        let [by_name, by_location, by_facilities]: [_; 3] = matrices
            .try_into()
            .map_err(|_| EstateError::ArtifactLoad("expected three similarity matrices".into()))?;
        let similarity = SimilarityMatrices::new(by_name, by_location, by_facilities)?;

        let domains = AttributeDomains::from_reference_csv(open_required(dir, REFERENCE_FILE)?)?;

        let mut store = Self::new(index, distances, similarity, domains)?;

        let market_path = dir.join(MARKET_FILE);
        if market_path.exists() {
            let market = MarketDataset::from_csv(BufReader::new(File::open(&market_path)?))
                .map_err(|e| EstateError::ArtifactLoad(format!("{MARKET_FILE}: {e}")))?;
            store = store.with_market(market);
        } else {
            tracing::warn!("{MARKET_FILE} not found; market analytics disabled");
        }

        let text_path = dir.join(FEATURE_TEXT_FILE);
        if text_path.exists() {
            store = store.with_feature_text(std::fs::read_to_string(&text_path)?);
        } else {
            tracing::warn!("{FEATURE_TEXT_FILE} not found; feature terms disabled");
        }

        store.log_loaded();
        Ok(store)
    }

    fn log_loaded(&self) {
        tracing::info!(
            "Loaded {} properties, {} landmarks, {} sectors",
            self.index.len(),
            self.distances.landmarks().len(),
            self.domains.sectors.len()
        );
    }

    pub fn index(&self) -> &PropertyIndex {
        &self.index
    }

    pub fn distances(&self) -> &DistanceTable {
        &self.distances
    }

    pub fn similarity(&self) -> &SimilarityMatrices {
        &self.similarity
    }

    pub fn domains(&self) -> &AttributeDomains {
        &self.domains
    }

    pub fn landmarks(&self) -> &[String] {
        self.distances.landmarks()
    }

    pub fn market(&self) -> EstateResult<&MarketDataset> {
        self.market
            .as_ref()
            .ok_or_else(|| EstateError::ArtifactMissing(format!("{MARKET_FILE} was not loaded")))
    }

    pub fn feature_text(&self) -> EstateResult<&str> {
        self.feature_text.as_deref().ok_or_else(|| {
            EstateError::ArtifactMissing(format!("{FEATURE_TEXT_FILE} was not loaded"))
        })
    }

    pub(crate) fn market_opt(&self) -> Option<&MarketDataset> {
        self.market.as_ref()
    }

    pub(crate) fn feature_text_opt(&self) -> Option<&str> {
        self.feature_text.as_deref()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            properties: self.index.len(),
            landmarks: self.distances.landmarks().len(),
            sectors: self.domains.sectors.len(),
            market_listings: self.market.as_ref().map(MarketDataset::len),
            feature_text: self.feature_text.is_some(),
        }
    }

    /// Validate `query` and price it.
    pub fn estimate(
        &self,
        pipeline: &dyn PricePipeline,
        query: &PriceQuery,
        band: &PriceBand,
    ) -> EstateResult<PriceEstimate> {
        let attributes = self.domains.validate(query)?;
        estimate_price(pipeline, &attributes, band)
    }

    pub fn nearby(&self, landmark: &str, radius_km: f64) -> EstateResult<NearbyResult> {
        search_nearby(&self.index, &self.distances, landmark, radius_km)
    }

    pub fn recommend(
        &self,
        property: &str,
        top_n: usize,
        weights: &SimilarityWeights,
    ) -> EstateResult<Vec<Recommendation>> {
        recommend_similar(&self.index, &self.similarity, property, top_n, weights)
    }
}

fn open_required(dir: &Path, file: &str) -> EstateResult<BufReader<File>> {
    let path = dir.join(file);
    File::open(&path).map(BufReader::new).map_err(|e| {
        EstateError::ArtifactLoad(format!("Cannot open {}: {e}", path.display()))
    })
}
