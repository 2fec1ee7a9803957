//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

use estate_explorer::pipeline::MODEL_FILENAME;
use estate_explorer::{PriceBand, SimilarityWeights};

use crate::types::{McpError, McpResult};

pub const DATA_DIR_ENV: &str = "ESTATE_DATA_DIR";
pub const MODEL_ENV: &str = "ESTATE_MODEL";
pub const WEIGHTS_ENV: &str = "ESTATE_WEIGHTS";
pub const PRICE_MARGIN_ENV: &str = "ESTATE_PRICE_MARGIN";
pub const TOKEN_ENV: &str = "ESTATE_TOKEN";

/// Resolve the artifact location (directory or `.estate` bundle).
///
/// Order: explicit flag, `ESTATE_DATA_DIR`, `./datasets`, then
/// `~/.estate-explorer/data`.
pub fn resolve_data_dir(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(env_path);
    }

    let cwd_data = PathBuf::from("datasets");
    if cwd_data.exists() {
        return cwd_data;
    }

    resolve_default_data_dir()
}

fn resolve_default_data_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    PathBuf::from(home).join(".estate-explorer").join("data")
}

/// Resolve the ONNX model path: flag, `ESTATE_MODEL`, then the data directory.
///
/// A bundle path has no model inside it, so the model is looked up next to
/// the bundle.
pub fn resolve_model_path(explicit: Option<&str>, data: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(MODEL_ENV) {
        return PathBuf::from(env_path);
    }

    if data.is_file() {
        data.parent()
            .unwrap_or_else(|| Path::new("."))
            .join(MODEL_FILENAME)
    } else {
        data.join(MODEL_FILENAME)
    }
}

/// Scoring policy shared by every request in a session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoringConfig {
    pub weights: SimilarityWeights,
    pub band: PriceBand,
}

impl ScoringConfig {
    /// Combine CLI flags with `ESTATE_WEIGHTS` / `ESTATE_PRICE_MARGIN`.
    pub fn resolve(weights: Option<&str>, margin: Option<f64>) -> McpResult<Self> {
        let weights = match weights
            .map(str::to_string)
            .or_else(|| std::env::var(WEIGHTS_ENV).ok())
        {
            Some(raw) => raw.parse::<SimilarityWeights>()?,
            None => SimilarityWeights::default(),
        };

        let margin = match margin {
            Some(m) => Some(m),
            None => match std::env::var(PRICE_MARGIN_ENV) {
                Ok(raw) => Some(raw.trim().parse::<f64>().map_err(|_| {
                    McpError::InvalidParams(format!("{PRICE_MARGIN_ENV} is not a number: '{raw}'"))
                })?),
                Err(_) => None,
            },
        };
        let band = match margin {
            Some(m) => PriceBand::new(m)?,
            None => PriceBand::default(),
        };

        Ok(Self { weights, band })
    }
}

/// Bearer token for the HTTP transport: flag, then `ESTATE_TOKEN`.
pub fn resolve_token(explicit: Option<String>) -> Option<String> {
    explicit.or_else(|| std::env::var(TOKEN_ENV).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_paths_win() {
        assert_eq!(resolve_data_dir(Some("/srv/gurgaon")), PathBuf::from("/srv/gurgaon"));
        assert_eq!(
            resolve_model_path(Some("/models/p.onnx"), Path::new("/srv/gurgaon")),
            PathBuf::from("/models/p.onnx")
        );
    }

    #[test]
    fn test_explicit_scoring() {
        let cfg = ScoringConfig::resolve(Some("1,1,1"), Some(0.5)).unwrap();
        assert_eq!(cfg.weights, SimilarityWeights::new(1.0, 1.0, 1.0).unwrap());
        assert_eq!(cfg.band.margin, 0.5);

        let err = ScoringConfig::resolve(Some("1,1"), None).unwrap_err();
        assert_eq!(err.code(), crate::types::error_codes::INVALID_PARAMS);
        assert!(ScoringConfig::resolve(None, Some(-1.0)).is_err());
    }
}
