//! Estate Explorer MCP server: price estimates, landmark radius search,
//! similar-property recommendations and market analytics for LLM clients.

pub mod config;
pub mod prompts;
pub mod protocol;
pub mod repl;
pub mod resources;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::{resolve_data_dir, resolve_model_path, ScoringConfig};
pub use protocol::ProtocolHandler;
pub use session::EstateSession;
pub use transport::StdioTransport;
