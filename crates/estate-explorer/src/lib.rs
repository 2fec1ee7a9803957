//! Estate Explorer: price estimates, landmark radius search, similar-property
//! recommendations and market analytics over precomputed real-estate artifacts.

pub mod analytics;
pub mod domain;
pub mod estimator;
pub mod index;
pub mod nearby;
pub mod pipeline;
pub mod similarity;
pub mod storage;
pub mod store;
pub mod tables;
pub mod types;

pub use analytics::{feature_terms, MarketDataset, MarketListing};
pub use domain::{AttributeDomains, FeatureRow, FeatureValue, PriceQuery, ValidatedAttributes};
pub use estimator::estimate_price;
pub use index::PropertyIndex;
pub use nearby::search_nearby;
#[cfg(feature = "onnx")]
pub use pipeline::OnnxPipeline;
pub use pipeline::{open_pipeline, PricePipeline, UnavailablePipeline};
pub use similarity::recommend_similar;
pub use storage::{EstateReader, EstateWriter};
pub use store::{ArtifactStore, StoreStats};
pub use tables::{DistanceTable, SimilarityMatrices};
pub use types::*;
