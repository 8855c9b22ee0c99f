//! MCP request dispatcher for the editor-context server.
//!
//! [`McpServer`] maps one JSON-RPC request to one reply. It keeps no state
//! between calls beyond the protocol constants and the resource registry,
//! so the same instance can answer any number of HTTP requests.
//!
//! # Methods
//!
//! | method           | result                                         |
//! |------------------|------------------------------------------------|
//! | `initialize`     | protocol version, capabilities, server info    |
//! | `resources/list` | the registered resource descriptors            |
//! | `resources/read` | `contents[0].text` holds the rendered resource |
//!
//! Any other method, including a missing one, is `-32601`. Failures while
//! reading a resource are `-32603`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::editor::EditorHost;
use crate::error::ResourceError;
use crate::mcp::protocol::{
    parse_message, JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION,
    SERVER_NAME,
};
use crate::mcp::resources::ResourceRegistry;

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Resource-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceCapabilities>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            resources: Some(ResourceCapabilities::default()),
        }
    }
}

/// Resource-specific capabilities.
///
/// This server is pull-only, so both flags stay off and the object
/// serialises as `{}`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCapabilities {
    /// Whether clients may subscribe to resource updates.
    #[serde(skip_serializing_if = "is_false")]
    pub subscribe: bool,
    /// Whether the resource list can change during the session.
    #[serde(skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Parameters for the resources/read request.
#[derive(Debug, Clone, Default, Deserialize)]
struct ReadResourceParams {
    /// URI of the resource to read.
    #[serde(default)]
    uri: Option<String>,
}

/// The MCP dispatcher.
#[derive(Debug)]
pub struct McpServer {
    /// Resources this server can read.
    registry: ResourceRegistry,
}

impl McpServer {
    /// Creates a dispatcher serving the default resources from `host`.
    #[must_use]
    pub fn new(host: Arc<dyn EditorHost>) -> Self {
        Self::with_registry(ResourceRegistry::new(host))
    }

    /// Creates a dispatcher over a custom registry.
    #[must_use]
    pub const fn with_registry(registry: ResourceRegistry) -> Self {
        Self { registry }
    }

    /// Returns the resource registry.
    #[must_use]
    pub const fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Parses a raw request body and dispatches it.
    ///
    /// A panic raised by the host while the request is being handled is
    /// caught and reported as an internal error.
    ///
    /// # Errors
    ///
    /// Returns a `JsonRpcError` if the body cannot be parsed or the method
    /// fails.
    pub fn handle_body(&self, body: &[u8]) -> Result<JsonRpcResponse, JsonRpcError> {
        let req = parse_message(body)?;

        panic::catch_unwind(AssertUnwindSafe(|| self.handle_request(&req))).unwrap_or_else(
            |payload| {
                let message = panic_message(payload.as_ref());
                tracing::error!(method = %req.method_name(), %message, "Request handler panicked");
                Err(JsonRpcError::internal_error(req.id.clone(), message))
            },
        )
    }

    /// Dispatches a parsed request.
    ///
    /// # Errors
    ///
    /// Returns a `JsonRpcError` for unknown methods and failed reads.
    pub fn handle_request(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        tracing::debug!(method = %req.method_name(), "Handling request");

        match req.method() {
            Some("initialize") => Ok(Self::handle_initialize(req)),
            Some("resources/list") => Ok(self.handle_resources_list(req)),
            Some("resources/read") => self.handle_resources_read(req),
            _ => Err(JsonRpcError::method_not_found(
                req.id.clone(),
                &req.method_name(),
            )),
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(req: &JsonRpcRequest) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        JsonRpcResponse::success(req.id.clone(), result)
    }

    /// Handles the resources/list request.
    fn handle_resources_list(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        let result = json!({
            "resources": self.registry.list_resources(),
        });

        JsonRpcResponse::success(req.id.clone(), result)
    }

    /// Handles the resources/read request.
    fn handle_resources_read(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        let params: ReadResourceParams = req
            .params
            .as_ref()
            .filter(|p| !p.is_null())
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::internal_error(
                    req.id.clone(),
                    format!("Invalid resources/read params: {e}"),
                )
            })?
            .unwrap_or_default();

        let contents = params
            .uri
            .as_deref()
            .ok_or(ResourceError::UnknownResource { uri: None })
            .and_then(|uri| self.registry.read_resource(uri))
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to read resource");
                JsonRpcError::internal_error(req.id.clone(), e.to_string())
            })?;

        let result = json!({
            "contents": [contents],
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "request handler panicked".to_string())
}

/// Serialises a reply envelope.
///
/// # Errors
///
/// Returns an error if the reply cannot be encoded.
pub fn reply_to_json(
    reply: &Result<JsonRpcResponse, JsonRpcError>,
) -> Result<Value, serde_json::Error> {
    match reply {
        Ok(response) => serde_json::to_value(response),
        Err(error) => serde_json::to_value(error),
    }
}
