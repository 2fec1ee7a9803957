//! MCP prompt implementations.

pub mod market_brief;
pub mod registry;
pub mod shortlist;
pub mod valuation;

pub use registry::PromptRegistry;
