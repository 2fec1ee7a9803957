//! MCP tool implementations.

pub mod estimate_price;
pub mod feature_terms;
pub mod market_area_price;
pub mod market_bhk;
pub mod market_price_spread;
pub mod market_sectors;
pub mod recommend_similar;
pub mod registry;
pub mod search_nearby;

pub use registry::ToolRegistry;

/// Round for display. Computation never uses rounded values.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
