//! MCP resource implementations.

pub mod catalog;
pub mod nearby;
pub mod registry;
pub mod similar;
pub mod stats;
pub mod templates;

pub use registry::ResourceRegistry;
