//! Regression pipeline: validated attributes → log-scale price.

use std::path::{Path, PathBuf};

use crate::domain::FeatureRow;
use crate::types::{EstateError, EstateResult};

/// Default model filename inside the data directory.
pub const MODEL_FILENAME: &str = "pipeline.onnx";

/// A trained price model. Output is `log1p(price in crore)`.
pub trait PricePipeline: Send + Sync {
    fn predict(&self, row: &FeatureRow) -> EstateResult<f64>;

    /// Short human-readable description for `info` output.
    fn describe(&self) -> String {
        "custom pipeline".to_string()
    }
}

/// Stands in when no model file is present. Every prediction fails with
/// `ArtifactMissing`, so the rest of the server keeps working.
#[derive(Debug, Clone)]
pub struct UnavailablePipeline {
    path: PathBuf,
}

impl UnavailablePipeline {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PricePipeline for UnavailablePipeline {
    fn predict(&self, _row: &FeatureRow) -> EstateResult<f64> {
        Err(EstateError::ArtifactMissing(format!(
            "price model not found at {}",
            self.path.display()
        )))
    }

    fn describe(&self) -> String {
        format!("unavailable ({})", self.path.display())
    }
}

/// Load the ONNX model if it exists, otherwise fall back to [`UnavailablePipeline`].
pub fn open_pipeline(path: &Path) -> EstateResult<Box<dyn PricePipeline>> {
    if !path.exists() {
        tracing::warn!(
            "Price model not found at {}. Price estimates are disabled.",
            path.display()
        );
        return Ok(Box::new(UnavailablePipeline::new(path)));
    }

    #[cfg(feature = "onnx")]
    {
        Ok(Box::new(onnx::OnnxPipeline::load(path)?))
    }

    #[cfg(not(feature = "onnx"))]
    {
        tracing::warn!(
            "Built without the `onnx` feature; ignoring model at {}",
            path.display()
        );
        Ok(Box::new(UnavailablePipeline::new(path)))
    }
}

#[cfg(feature = "onnx")]
pub use onnx::OnnxPipeline;

#[cfg(feature = "onnx")]
mod onnx {
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use ndarray::Array2;
    use ort::session::Session;
    use ort::value::{DynValue, Tensor};

    use super::PricePipeline;
    use crate::domain::{FeatureRow, FeatureValue};
    use crate::types::{EstateError, EstateResult};

    /// Pipeline exported to ONNX, one `[1, 1]` input per column.
    pub struct OnnxPipeline {
        session: Mutex<Session>,
        path: PathBuf,
    }

    impl OnnxPipeline {
        pub fn load(path: &Path) -> EstateResult<Self> {
            tracing::info!("Loading price model from {}", path.display());

            let session = Session::builder()
                .and_then(|b| b.with_intra_threads(1))
                .and_then(|b| b.commit_from_file(path))
                .map_err(|e| {
                    EstateError::ArtifactLoad(format!("Failed to load ONNX model: {e}"))
                })?;

            tracing::info!("Price model loaded");
            Ok(Self {
                session: Mutex::new(session),
                path: path.to_path_buf(),
            })
        }

        fn tensor(value: &FeatureValue) -> EstateResult<DynValue> {
            let tensor = match value {
                FeatureValue::Text(s) => {
                    Tensor::from_string_array(&Array2::from_elem((1, 1), s.clone()))
                        .map(Tensor::into_dyn)
                }
                FeatureValue::Number(n) => {
                    Tensor::from_array(Array2::from_elem((1, 1), *n as f32)).map(Tensor::into_dyn)
                }
            };
            tensor.map_err(|e| EstateError::Pipeline(format!("Failed to create input tensor: {e}")))
        }
    }

    impl PricePipeline for OnnxPipeline {
        fn predict(&self, row: &FeatureRow) -> EstateResult<f64> {
            let mut inputs: Vec<(String, DynValue)> = Vec::with_capacity(row.len());
            for (column, value) in row.iter() {
                inputs.push((column.to_string(), Self::tensor(value)?));
            }

            let mut session = self
                .session
                .lock()
                .map_err(|_| EstateError::Pipeline("model session lock poisoned".to_string()))?;

            let outputs = session
                .run(inputs)
                .map_err(|e| EstateError::Pipeline(format!("ONNX inference failed: {e}")))?;

            require_outputs(outputs.len())?;
            let (_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| EstateError::Pipeline(format!("Failed to extract output: {e}")))?;

            data.first()
                .map(|v| *v as f64)
                .ok_or_else(|| EstateError::Pipeline("model returned an empty output".to_string()))
        }

        fn describe(&self) -> String {
            format!("onnx ({})", self.path.display())
        }
    }

    fn require_outputs(count: usize) -> EstateResult<()> {
        if count == 0 {
            return Err(EstateError::Pipeline(
                "model declares no outputs".to_string(),
            ));
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_model_without_outputs_is_pipeline_error() {
            assert!(matches!(require_outputs(0), Err(EstateError::Pipeline(_))));
            assert!(require_outputs(1).is_ok());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tests::{sample_query, REFERENCE};
    use crate::domain::AttributeDomains;

    #[test]
    fn test_missing_model_falls_back() {
        let pipeline = open_pipeline(Path::new("/nonexistent/pipeline.onnx")).unwrap();
        assert!(pipeline.describe().starts_with("unavailable"));

        let domains = AttributeDomains::from_reference_csv(REFERENCE.as_bytes()).unwrap();
        let row = domains.validate(&sample_query()).unwrap().feature_row();
        assert!(matches!(
            pipeline.predict(&row),
            Err(EstateError::ArtifactMissing(_))
        ));
    }
}
