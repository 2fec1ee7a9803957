//! Main request dispatcher: receives JSON-RPC messages and routes them to
//! the tool, resource, and prompt registries.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::prompts::PromptRegistry;
use crate::resources::ResourceRegistry;
use crate::session::EstateSession;
use crate::tools::ToolRegistry;
use crate::types::*;

use super::negotiation::NegotiatedCapabilities;
use super::validator::validate_request;

/// Dispatches incoming JSON-RPC messages against one shared session.
pub struct ProtocolHandler {
    session: Arc<EstateSession>,
    capabilities: NegotiatedCapabilities,
}

impl ProtocolHandler {
    pub fn new(session: Arc<EstateSession>) -> Self {
        Self {
            session,
            capabilities: NegotiatedCapabilities::default(),
        }
    }

    pub fn session(&self) -> &Arc<EstateSession> {
        &self.session
    }

    pub fn capabilities(&self) -> &NegotiatedCapabilities {
        &self.capabilities
    }

    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif);
                None
            }
            _ => {
                tracing::warn!("Received unexpected message type from client");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        if let Err(e) = validate_request(&request) {
            return serde_json::to_value(e.to_json_rpc_error(request.id)).unwrap_or_default();
        }

        let id = request.id.clone();
        match self.dispatch_request(&request).await {
            Ok(value) => serde_json::to_value(JsonRpcResponse::new(id, value)).unwrap_or_default(),
            Err(e) => {
                tracing::debug!("{} failed: {e}", request.method);
                serde_json::to_value(e.to_json_rpc_error(id)).unwrap_or_default()
            }
        }
    }

    async fn dispatch_request(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        let params = request.params.clone();
        match request.method.as_str() {
            "initialize" => {
                let init: InitializeParams = required_params(params, "Initialize")?;
                to_value(self.capabilities.negotiate(init)?)
            }
            "shutdown" => {
                tracing::info!("Shutdown requested");
                Ok(empty())
            }

            "tools/list" => to_value(ToolListResult {
                tools: ToolRegistry::list_tools(),
                next_cursor: None,
            }),
            "tools/call" => {
                let call: ToolCallParams = required_params(params, "Tool call")?;
                to_value(ToolRegistry::call(&call.name, call.arguments, &self.session).await?)
            }

            "resources/list" => to_value(ResourceListResult {
                resources: ResourceRegistry::list_resources(),
                next_cursor: None,
            }),
            "resources/templates/list" => to_value(ResourceTemplateListResult {
                resource_templates: ResourceRegistry::list_templates(),
                next_cursor: None,
            }),
            "resources/read" => {
                let read: ResourceReadParams = required_params(params, "Resource read")?;
                to_value(ResourceRegistry::read(&read.uri, &self.session).await?)
            }

            "prompts/list" => to_value(PromptListResult {
                prompts: PromptRegistry::list_prompts(),
                next_cursor: None,
            }),
            "prompts/get" => {
                let get: PromptGetParams = required_params(params, "Prompt get")?;
                to_value(PromptRegistry::get(&get.name, get.arguments).await?)
            }

            "ping" => Ok(empty()),

            _ => Err(McpError::MethodNotFound(request.method.clone())),
        }
    }

    fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "initialized" | "notifications/initialized" => self.capabilities.mark_initialized(),
            "notifications/cancelled" | "$/cancelRequest" => {
                tracing::info!("Received cancellation notification; requests run to completion");
            }
            _ => {
                tracing::warn!("Unknown notification: {}", notification.method);
            }
        }
    }
}

fn empty() -> Value {
    Value::Object(serde_json::Map::new())
}

fn to_value(result: impl Serialize) -> McpResult<Value> {
    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}
