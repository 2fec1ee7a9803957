//! MCP capability negotiation during initialization.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::types::{
    ClientCapabilities, Implementation, InitializeParams, InitializeResult, McpResult,
    MCP_VERSION,
};

/// Handshake state. Written once by `initialize` and `initialized`.
#[derive(Debug, Default)]
pub struct NegotiatedCapabilities {
    client: OnceLock<(Implementation, ClientCapabilities)>,
    initialized: AtomicBool,
}

impl NegotiatedCapabilities {
    pub fn negotiate(&self, params: InitializeParams) -> McpResult<InitializeResult> {
        if params.protocol_version != MCP_VERSION {
            tracing::warn!(
                "Client requested protocol version {}, server supports {}. Proceeding with server version.",
                params.protocol_version,
                MCP_VERSION
            );
        }

        tracing::info!(
            "Initialized with client: {} v{}",
            params.client_info.name,
            params.client_info.version
        );

        if self
            .client
            .set((params.client_info, params.capabilities))
            .is_err()
        {
            tracing::warn!("Repeated initialize; keeping the first client's capabilities");
        }

        Ok(InitializeResult::default_result())
    }

    pub fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::SeqCst);
        tracing::info!(
            "MCP handshake complete ({})",
            self.client_name().unwrap_or("unknown client")
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Name of the connected client, once `initialize` has run.
    pub fn client_name(&self) -> Option<&str> {
        self.client.get().map(|(info, _)| info.name.as_str())
    }
}
