//! Integration tests for MCP protocol handling.
//!
//! These tests drive the dispatcher with raw request bodies, the same way
//! the HTTP transport does, and check the JSON that would go on the wire.

use std::sync::Arc;

use editor_context_mcp::editor::{FixtureHost, HostState, Region, Snapshot, ViewState, WindowState};
use editor_context_mcp::mcp::protocol::{parse_message, ErrorCode, RequestId};
use editor_context_mcp::mcp::server::reply_to_json;
use editor_context_mcp::mcp::{McpServer, MCP_PROTOCOL_VERSION, STATE_URI};
use proptest::prelude::*;
use serde_json::{json, Value};

fn sample_host() -> FixtureHost {
    FixtureHost::new(HostState::new(vec![
        WindowState::new()
            .with_folder("/work/back")
            .with_view(ViewState::file("/work/back/notes.md"))
            .focused(0),
        WindowState::new()
            .with_folder("/work/front")
            .with_view(
                ViewState::file("/work/front/main.rs")
                    .with_text("fn main() {\n    run();\n}\n")
                    .with_selection(Region::cursor(16)),
            )
            .with_view(ViewState::file("/work/front/lib.rs"))
            .with_view(ViewState::unsaved())
            .focused(0),
    ]))
}

fn server() -> McpServer {
    McpServer::new(Arc::new(sample_host()))
}

fn call(server: &McpServer, body: &Value) -> Value {
    let reply = server.handle_body(body.to_string().as_bytes());
    reply_to_json(&reply).unwrap()
}

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let json = br#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            }
        }
    }"#;

    let req = parse_message(json).unwrap();
    assert_eq!(req.method(), Some("initialize"));
    assert_eq!(req.id, Some(RequestId::Number(1)));
}

#[test]
fn test_parse_invalid_json() {
    let err = parse_message(b"not valid json").unwrap_err();
    assert_eq!(err.error.code, ErrorCode::InternalError.code());
    assert_eq!(err.id, None);
}

// =============================================================================
// Dispatch Tests
// =============================================================================

#[test]
fn test_initialize_round_trip() {
    let reply = call(
        &server(),
        &json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    );

    assert_eq!(reply["id"], 1);
    assert_eq!(reply["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
    assert_eq!(reply["result"]["capabilities"], json!({"resources": {}}));
    assert_eq!(reply["result"]["serverInfo"]["name"], "sublime-editor-context");
    assert_eq!(
        reply["result"]["serverInfo"]["version"],
        env!("CARGO_PKG_VERSION")
    );
}

#[test]
fn test_unknown_method() {
    let reply = call(&server(), &json!({"method": "foo/bar", "id": 42}));

    assert_eq!(reply["id"], 42);
    assert_eq!(reply["error"]["code"], -32601);
    assert!(reply["error"]["message"].as_str().unwrap().contains("foo/bar"));
    assert!(reply.get("result").is_none());
}

#[test]
fn test_non_string_method_is_method_not_found() {
    let reply = call(&server(), &json!({"method": 12, "id": 9}));

    assert_eq!(reply["id"], 9);
    assert_eq!(reply["error"]["code"], -32601);
    assert_eq!(reply["error"]["message"], "Method not found: 12");
}

#[test]
fn test_request_without_id_echoes_null() {
    let reply = call(&server(), &json!({"jsonrpc": "2.0", "method": "resources/list"}));

    assert!(reply["id"].is_null());
    assert!(reply["result"]["resources"].is_array());
}

#[test]
fn test_string_id_echoed_verbatim() {
    let reply = call(&server(), &json!({"method": "initialize", "id": "req-7"}));
    assert_eq!(reply["id"], "req-7");
}

#[test]
fn test_resources_list() {
    let reply = call(&server(), &json!({"method": "resources/list", "id": 2}));

    assert_eq!(
        reply["result"]["resources"],
        json!([{
            "uri": "sublime-context://state",
            "name": "Editor State",
            "description": "Complete editor state with active files per window and other open files",
            "mimeType": "application/json"
        }])
    );
}

#[test]
fn test_resources_list_is_idempotent() {
    let server = server();
    let first = call(&server, &json!({"method": "resources/list", "id": 1}));
    let second = call(&server, &json!({"method": "resources/list", "id": 1}));
    assert_eq!(first, second);
}

#[test]
fn test_resources_read_happy_path() {
    let reply = call(
        &server(),
        &json!({"method": "resources/read", "params": {"uri": STATE_URI}, "id": 7}),
    );

    assert_eq!(reply["id"], 7);
    let contents = &reply["result"]["contents"][0];
    assert_eq!(contents["uri"], STATE_URI);
    assert_eq!(contents["mimeType"], "application/json");

    let text = contents["text"].as_str().unwrap();
    let snapshot: Snapshot = serde_json::from_str(text).unwrap();

    assert_eq!(snapshot.active_files.len(), 2);
    assert_eq!(
        snapshot.active_files[0].path.to_str(),
        Some("/work/front/main.rs")
    );
    assert_eq!(
        snapshot.active_files[1].path.to_str(),
        Some("/work/back/notes.md")
    );
    assert_eq!(snapshot.other_files.len(), 1);
    assert_eq!(snapshot.project_folders.len(), 2);

    let raw: Value = serde_json::from_str(text).unwrap();
    assert_eq!(
        raw["activeFiles"][0]["selection"],
        json!({"cursor": {"line": 2, "column": 4}})
    );
}

#[test]
fn test_resources_read_unknown_uri() {
    let reply = call(
        &server(),
        &json!({"method": "resources/read", "params": {"uri": "sublime-context://nope"}, "id": 8}),
    );

    assert_eq!(reply["id"], 8);
    assert_eq!(reply["error"]["code"], -32603);
    assert_eq!(
        reply["error"]["message"],
        "Unknown resource URI: sublime-context://nope"
    );
}

#[test]
fn test_resources_read_sees_state_changes() {
    let host = Arc::new(FixtureHost::empty());
    let server = McpServer::new(host.clone());
    let read = json!({"method": "resources/read", "params": {"uri": STATE_URI}, "id": 1});

    let before = call(&server, &read);
    let text = before["result"]["contents"][0]["text"].as_str().unwrap();
    let snapshot: Snapshot = serde_json::from_str(text).unwrap();
    assert_eq!(snapshot.file_count(), 0);

    host.set_state(HostState::new(vec![WindowState::new()
        .with_view(ViewState::file("/new.rs"))
        .focused(0)]));

    let after = call(&server, &read);
    let text = after["result"]["contents"][0]["text"].as_str().unwrap();
    let snapshot: Snapshot = serde_json::from_str(text).unwrap();
    assert_eq!(snapshot.active_files.len(), 1);
}

#[test]
fn test_notification_is_method_not_found() {
    let reply = call(
        &server(),
        &json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
    );

    assert!(reply["id"].is_null());
    assert_eq!(reply["error"]["code"], -32601);
}

// =============================================================================
// Robustness
// =============================================================================

proptest! {
    #[test]
    fn arbitrary_bodies_always_get_an_envelope(body in proptest::collection::vec(any::<u8>(), 0..256)) {
        let reply = server().handle_body(&body);
        let value = reply_to_json(&reply).unwrap();

        prop_assert_eq!(&value["jsonrpc"], "2.0");
        prop_assert!(value.get("result").is_some() != value.get("error").is_some());
    }

    #[test]
    fn any_method_name_is_answered(method in "\\PC*", id in any::<i64>()) {
        let reply = call(&server(), &json!({"method": method, "id": id}));
        prop_assert_eq!(&reply["id"], &json!(id));
    }
}
