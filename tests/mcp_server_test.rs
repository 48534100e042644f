//! End-to-end tests for the MCP stdio server
//!
//! Feeds newline-delimited JSON-RPC into `McpServer::serve` and inspects the
//! responses it writes back.

#![cfg(unix)]

mod common;

use common::*;
use ring_mcp_core::mcp::protocol::codes;
use ring_mcp_core::{McpServer, Presenter, RequestCorrelator, ToolHandler};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, BufReader};

/// Run a whole session and return the responses in the order written
async fn run_session(handler: ToolHandler, requests: &[Value]) -> Vec<Value> {
    let input: String = requests
        .iter()
        .map(|r| format!("{}\n", r))
        .collect();

    let (mut client, server_side) = tokio::io::duplex(64 * 1024);
    let server = McpServer::new(handler);

    server
        .serve(BufReader::new(input.as_bytes()), server_side)
        .await
        .unwrap();

    let mut output = String::new();
    client.read_to_string(&mut output).await.unwrap();

    output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn call_ring(id: u64, title: &str, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {
            "name": "ring",
            "arguments": {"title": title, "message": message}
        }
    })
}

fn by_id(responses: &[Value], id: u64) -> &Value {
    responses
        .iter()
        .find(|r| r["id"] == json!(id))
        .unwrap_or_else(|| panic!("no response with id {}", id))
}

fn result_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn test_full_session() {
    let temp = TempDir::new().unwrap();
    let handler = create_test_handler(temp.path(), &answer_script("ship it"));

    let responses = run_session(
        handler,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            call_ring(3, "Release ready", "Tag v1.2?"),
        ],
    )
    .await;

    assert_eq!(responses.len(), 3, "notifications must not be answered");

    let init = by_id(&responses, 1);
    assert_eq!(init["result"]["serverInfo"]["name"], "ring-mcp");

    let tools = &by_id(&responses, 2)["result"]["tools"];
    assert_eq!(tools.as_array().unwrap().len(), 1);
    assert_eq!(tools[0]["name"], "ring");
    assert!(tools[0]["inputSchema"].is_object());

    let ring = by_id(&responses, 3);
    assert_eq!(ring["result"]["content"][0]["type"], "text");
    assert_eq!(result_text(ring), "User answered: ship it");
    assert!(handoff_entries(temp.path()).is_empty());
}

#[tokio::test]
async fn test_pending_ring_does_not_block_other_requests() {
    let temp = TempDir::new().unwrap();
    let script = format!("sleep 1; {}", answer_script("late"));
    let handler = create_test_handler(temp.path(), &script);

    let responses = run_session(
        handler,
        &[
            call_ring(1, "Slow", "waiting"),
            json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}),
        ],
    )
    .await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 2, "ping should answer first");
    assert_eq!(result_text(&responses[1]), "User answered: late");
}

#[tokio::test]
async fn test_dismissal_over_protocol() {
    let temp = TempDir::new().unwrap();
    let handler = create_test_handler(temp.path(), DISMISS_SCRIPT);

    let responses = run_session(handler, &[call_ring(9, "Heads up", "Tests passed")]).await;

    assert_eq!(
        result_text(by_id(&responses, 9)),
        "User dismissed the notification without answering."
    );
}

#[tokio::test]
async fn test_unknown_tool_never_spawns() {
    let temp = TempDir::new().unwrap();
    let marker = temp.path().join("spawned");
    let handler = create_test_handler(temp.path(), &format!("touch '{}'", marker.display()));

    let responses = run_session(
        handler,
        &[json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {"name": "buzz", "arguments": {"title": "t", "message": "m"}}
        })],
    )
    .await;

    let error = &by_id(&responses, 4)["error"];
    assert_eq!(error["code"], codes::TOOL_ERROR);
    assert!(error["message"].as_str().unwrap().contains("Unknown tool: buzz"));
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_launch_failure_is_an_error_response() {
    let temp = TempDir::new().unwrap();
    let handler = ToolHandler::new(RequestCorrelator::new(
        Presenter::new(Path::new("/definitely/not/here/ring-popup"), vec![]),
        temp.path(),
    ));

    let responses = run_session(handler, &[call_ring(5, "t", "m")]).await;

    let error = &by_id(&responses, 5)["error"];
    assert_eq!(error["code"], codes::TOOL_ERROR);
    assert!(error["message"]
        .as_str()
        .unwrap()
        .contains("Failed to spawn notification"));
}

#[tokio::test]
async fn test_missing_arguments_is_invalid_params() {
    let temp = TempDir::new().unwrap();
    let handler = create_test_handler(temp.path(), SILENT_SCRIPT);

    let responses = run_session(
        handler,
        &[json!({
            "jsonrpc": "2.0",
            "id": 6,
            "method": "tools/call",
            "params": {"name": "ring", "arguments": {"title": "no message"}}
        })],
    )
    .await;

    assert_eq!(by_id(&responses, 6)["error"]["code"], codes::INVALID_PARAMS);
}

#[tokio::test]
async fn test_garbage_line_gets_parse_error() {
    let temp = TempDir::new().unwrap();
    let handler = create_test_handler(temp.path(), SILENT_SCRIPT);

    let (mut client, server_side) = tokio::io::duplex(4096);
    McpServer::new(handler)
        .serve(BufReader::new(&b"this is not json\n\n"[..]), server_side)
        .await
        .unwrap();

    let mut output = String::new();
    client.read_to_string(&mut output).await.unwrap();
    let responses: Vec<Value> = output
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["error"]["code"], codes::PARSE_ERROR);
    assert_eq!(responses[0]["id"], Value::Null);
}
