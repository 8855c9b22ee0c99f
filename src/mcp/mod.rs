//! Model Context Protocol (MCP) server implementation.
//!
//! This module exposes editor state as an MCP resource. Clients talk to it
//! with JSON-RPC 2.0 messages POSTed over HTTP to the loopback interface.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌─────────────┐    ┌─────────────┐    ┌─────────────┐      │
//! │   │  Transport  │───▶│   Server    │───▶│  Resources  │      │
//! │   │   (HTTP)    │    │ (dispatch)  │    │ (registry)  │      │
//! │   └─────────────┘    └─────────────┘    └─────────────┘      │
//! │          │                  │                  │             │
//! │          ▼                  ▼                  ▼             │
//! │   ┌──────────────────────────────┐   ┌──────────────────┐    │
//! │   │      JSON-RPC Messages       │   │ Snapshot Builder │    │
//! │   └──────────────────────────────┘   └──────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod resources;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use resources::{ResourceDescriptor, ResourceRegistry, STATE_URI};
pub use server::McpServer;
pub use transport::{HttpServer, ServerState, DEFAULT_PORT};
