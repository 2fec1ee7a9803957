//! Read-only session: artifact store, price model, and scoring policy.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use estate_explorer::{
    open_pipeline, ArtifactStore, NearbyResult, PriceBand, PriceEstimate, PricePipeline,
    PriceQuery, Recommendation, SimilarityWeights,
};

use crate::config::ScoringConfig;
use crate::types::McpResult;

/// Everything a request needs. Immutable once opened and shared as `Arc<EstateSession>`.
pub struct EstateSession {
    store: Arc<ArtifactStore>,
    pipeline: Arc<dyn PricePipeline>,
    scoring: ScoringConfig,
    source: Option<PathBuf>,
}

impl EstateSession {
    /// Load artifacts from `data` (directory or bundle) and the model at `model`.
    pub fn open(data: &Path, model: &Path, scoring: ScoringConfig) -> McpResult<Self> {
        let store = ArtifactStore::load(data)?;
        let pipeline: Arc<dyn PricePipeline> = Arc::from(open_pipeline(model)?);

        tracing::info!(
            "Session ready: {} properties, model {}",
            store.index().len(),
            pipeline.describe()
        );

        Ok(Self {
            store: Arc::new(store),
            pipeline,
            scoring,
            source: Some(data.to_path_buf()),
        })
    }

    /// Build a session from already-loaded parts.
    pub fn new(
        store: Arc<ArtifactStore>,
        pipeline: Arc<dyn PricePipeline>,
        scoring: ScoringConfig,
    ) -> Self {
        Self {
            store,
            pipeline,
            scoring,
            source: None,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn pipeline(&self) -> &dyn PricePipeline {
        self.pipeline.as_ref()
    }

    pub fn weights(&self) -> SimilarityWeights {
        self.scoring.weights
    }

    pub fn band(&self) -> PriceBand {
        self.scoring.band
    }

    /// Where the artifacts were loaded from, if from disk.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn estimate(&self, query: &PriceQuery) -> McpResult<PriceEstimate> {
        Ok(self
            .store
            .estimate(self.pipeline.as_ref(), query, &self.scoring.band)?)
    }

    pub fn nearby(&self, landmark: &str, radius_km: f64) -> McpResult<NearbyResult> {
        Ok(self.store.nearby(landmark, radius_km)?)
    }

    /// Recommend with the session weights unless `weights` overrides them.
    pub fn recommend(
        &self,
        property: &str,
        top_n: usize,
        weights: Option<SimilarityWeights>,
    ) -> McpResult<Vec<Recommendation>> {
        let weights = weights.unwrap_or(self.scoring.weights);
        Ok(self.store.recommend(property, top_n, &weights)?)
    }
}
