//! editor-context-mcp: MCP resource server for live editor state
//!
//! This library exposes a point-in-time snapshot of an editor's open files,
//! cursor positions and project folders to external tools. Clients speak
//! JSON-RPC 2.0 (MCP flavoured) over HTTP on the loopback interface.
//!
//! # Architecture
//!
//! The server is read-only and pull-only:
//!
//! - **Snapshot Builder**: Walks the host's windows and views on every read
//! - **Resource Registry**: Maps `sublime-context://state` to the snapshot
//! - **Dispatcher**: `initialize`, `resources/list`, `resources/read`
//! - **Transport**: One background thread serving HTTP on `127.0.0.1`
//!
//! The host editor is reached only through the [`editor::EditorHost`]
//! trait, so any editor (or a test double) can be plugged in.
//!
//! # Modules
//!
//! - [`config`] — Settings loading and validation
//! - [`editor`] — Host interface and snapshot construction
//! - [`error`] — Error types
//! - [`mcp`] — MCP protocol implementation
//! - [`plugin`] — Host lifecycle glue

pub mod config;
pub mod editor;
pub mod error;
pub mod mcp;
pub mod plugin;
