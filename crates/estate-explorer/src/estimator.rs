//! Price estimation over a validated attribute tuple.

use crate::domain::ValidatedAttributes;
use crate::pipeline::PricePipeline;
use crate::types::{EstateError, EstateResult, PriceBand, PriceEstimate};

/// Run the pipeline and turn its log-scale output into a price range (crore).
pub fn estimate_price(
    pipeline: &dyn PricePipeline,
    attributes: &ValidatedAttributes,
    band: &PriceBand,
) -> EstateResult<PriceEstimate> {
    let log_price = pipeline.predict(&attributes.feature_row())?;
    let expected = log_price.exp_m1();

    if !expected.is_finite() {
        return Err(EstateError::Pipeline(format!(
            "model produced a non-finite price (log output {log_price})"
        )));
    }

    tracing::debug!(
        "Estimated {} in {}: {expected:.3} cr",
        attributes.property_type(),
        attributes.sector()
    );
    Ok(band.apply(expected))
}
