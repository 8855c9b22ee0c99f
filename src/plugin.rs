//! Host plugin glue.
//!
//! A host editor wires these into its plugin lifecycle: [`EditorContextPlugin::load`]
//! when the plugin loads, [`EditorContextPlugin::unload`] when it unloads,
//! and [`show_state`] behind a debug command that opens the current
//! snapshot in a scratch buffer.

use std::sync::Arc;

use crate::config::Config;
use crate::editor::{build_snapshot, EditorHost};
use crate::mcp::{HttpServer, McpServer};

/// Title of the scratch buffer opened by the show-state command.
pub const SHOW_STATE_TITLE: &str = "Editor Context State";

/// Syntax the show-state buffer is highlighted with.
pub const JSON_SYNTAX: &str = "Packages/JavaScript/JSON.sublime-syntax";

/// A buffer the host should open to display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchBuffer {
    /// Buffer title.
    pub name: String,
    /// Syntax definition to apply.
    pub syntax: String,
    /// Whether the host should treat the buffer as never dirty.
    pub scratch: bool,
    /// Buffer contents.
    pub text: String,
}

/// Renders the current snapshot for the show-state debug command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be encoded as JSON.
pub fn show_state(host: &dyn EditorHost) -> Result<ScratchBuffer, serde_json::Error> {
    let text = serde_json::to_string_pretty(&build_snapshot(host))?;
    Ok(ScratchBuffer {
        name: SHOW_STATE_TITLE.to_string(),
        syntax: JSON_SYNTAX.to_string(),
        scratch: true,
        text,
    })
}

/// The loaded plugin: one HTTP server serving one host.
#[derive(Debug)]
pub struct EditorContextPlugin {
    server: HttpServer,
}

impl EditorContextPlugin {
    /// Starts serving `host` on the configured port.
    ///
    /// A bind failure is logged and leaves the plugin loaded with its
    /// server stopped.
    #[must_use]
    pub fn load(host: Arc<dyn EditorHost>, config: &Config) -> Self {
        let dispatcher = Arc::new(McpServer::new(host));
        let server = HttpServer::new(config.mcp_server_port, dispatcher);

        if let Err(e) = server.start() {
            tracing::warn!(error = %e, "Editor context server not running");
        }

        Self { server }
    }

    /// Stops the server. Calling it more than once is harmless.
    pub fn unload(&self) {
        self.server.stop();
    }

    /// The plugin's HTTP server.
    #[must_use]
    pub const fn server(&self) -> &HttpServer {
        &self.server
    }
}
