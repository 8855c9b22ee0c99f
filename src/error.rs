//! Error types for editor-context-mcp.
//!
//! Every layer gets its own enum so callers can tell a bad settings file
//! apart from a request for a resource that does not exist. None of these
//! ever reach a client as a Rust error; the dispatcher and transport turn
//! them into JSON-RPC error objects.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised while reading a registered resource.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// No resource is registered under the requested URI.
    ///
    /// `uri` is `None` when the request carried no `uri` parameter at all.
    #[error("Unknown resource URI: {}", .uri.as_deref().unwrap_or("null"))]
    UnknownResource {
        /// The URI the client asked for.
        uri: Option<String>,
    },

    /// The resource body could not be encoded as JSON.
    #[error("failed to serialise resource {uri}: {source}")]
    Serialize {
        /// URI of the resource being rendered.
        uri: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by the HTTP transport lifecycle.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The listener could not bind its address.
    #[error("failed to bind {addr}: {reason}")]
    Bind {
        /// The address we tried to listen on.
        addr: String,
        /// Description of the bind failure.
        reason: String,
    },

    /// A background server thread could not be spawned.
    #[error("failed to spawn server thread")]
    ThreadSpawn(#[source] std::io::Error),
}

/// Errors raised while loading a host-state fixture.
#[derive(Error, Debug)]
pub enum FixtureError {
    /// Fixture file could not be read.
    #[error("failed to read state fixture: {path}")]
    ReadError {
        /// Path to the fixture file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Fixture file is not a valid host state description.
    #[error("failed to parse state fixture: {path}")]
    ParseError {
        /// Path to the fixture file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
