//! MCP server with stdio transport
//!
//! Reads newline-delimited JSON-RPC 2.0 messages. Each request is handled on
//! its own task, so a `ring` waiting on its popup never holds up other
//! traffic. Responses funnel through one writer task in completion order.

use super::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION, MCP_PROTOCOL_VERSION};
use super::tools::ToolHandler;
use crate::error::{Result, RingError};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Name reported in `initialize`
pub const SERVER_NAME: &str = "ring-mcp";

/// MCP server that handles JSON-RPC requests over stdio
pub struct McpServer {
    tool_handler: Arc<ToolHandler>,
}

impl McpServer {
    pub fn new(tool_handler: ToolHandler) -> Self {
        Self {
            tool_handler: Arc::new(tool_handler),
        }
    }

    /// Run the server on stdin/stdout until EOF
    pub async fn run(&self) -> Result<()> {
        info!("Ring MCP server running on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve requests read from `reader`, writing responses to `writer`
    ///
    /// Returns once the input is exhausted and every pending request has
    /// been answered.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(write_responses(rx, writer));

        let mut lines = reader.lines();
        let mut pending = JoinSet::new();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }

                    debug!("Received request: {}", line);

                    let handler = Arc::clone(&self.tool_handler);
                    let tx = tx.clone();
                    pending.spawn(async move {
                        if let Some(response) = process_request(&handler, &line).await {
                            // Writer gone means stdout is closed; nothing left to tell.
                            let _ = tx.send(response);
                        }
                    });

                    while let Some(finished) = pending.try_join_next() {
                        log_task_result(finished);
                    }
                }
                Ok(None) => {
                    debug!("Received EOF, shutting down");
                    break;
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        if !pending.is_empty() {
            info!("Waiting for {} pending request(s)", pending.len());
        }
        while let Some(finished) = pending.join_next().await {
            log_task_result(finished);
        }

        drop(tx);
        writer_task
            .await
            .map_err(|e| RingError::Other(format!("Response writer failed: {}", e)))??;

        info!("MCP server shutting down");
        Ok(())
    }
}

fn log_task_result(result: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!("Request handler failed: {}", e);
    }
}

async fn write_responses<W>(mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let response_json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                let fallback = JsonRpcResponse::error(
                    response.id.clone(),
                    JsonRpcError::internal_error(format!("Serialization error: {}", e)),
                );
                serde_json::to_string(&fallback)?
            }
        };

        debug!("Sending response: {}", response_json);

        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Process a single JSON-RPC message; notifications yield no response
pub async fn process_request(handler: &ToolHandler, line: &str) -> Option<JsonRpcResponse> {
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(req) => req,
        Err(e) => {
            return Some(JsonRpcResponse::error(
                None,
                JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
            ));
        }
    };

    if request.is_notification() {
        debug!("Notification: {}", request.method);
        return None;
    }

    if request.jsonrpc != JSONRPC_VERSION {
        return Some(JsonRpcResponse::error(
            request.id,
            JsonRpcError::invalid_request("jsonrpc must be '2.0'"),
        ));
    }

    let response = match request.method.as_str() {
        "initialize" => handle_initialize(request),
        "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
        "tools/list" => handle_tools_list(handler, request),
        "tools/call" => handle_tools_call(handler, request).await,
        _ => JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&request.method)),
    };

    Some(response)
}

fn handle_initialize(request: JsonRpcRequest) -> JsonRpcResponse {
    debug!("Handling initialize");

    JsonRpcResponse::success(
        request.id,
        serde_json::json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {}
            }
        }),
    )
}

fn handle_tools_list(handler: &ToolHandler, request: JsonRpcRequest) -> JsonRpcResponse {
    debug!("Handling tools/list");

    JsonRpcResponse::success(
        request.id,
        serde_json::json!({
            "tools": handler.list_tools()
        }),
    )
}

async fn handle_tools_call(handler: &ToolHandler, request: JsonRpcRequest) -> JsonRpcResponse {
    let Some(params) = request.params.as_object() else {
        return JsonRpcResponse::error(
            request.id,
            JsonRpcError::invalid_params("params must be an object"),
        );
    };

    let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::error(
            request.id,
            JsonRpcError::invalid_params("missing 'name' field"),
        );
    };

    debug!("Handling tools/call for {}", tool_name);

    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

    match handler.execute(tool_name, arguments).await {
        Ok(text) => JsonRpcResponse::success(
            request.id,
            serde_json::json!({
                "content": [
                    {
                        "type": "text",
                        "text": text
                    }
                ]
            }),
        ),
        Err(RingError::InvalidArguments(msg)) => {
            warn!("Rejected arguments for {}: {}", tool_name, msg);
            JsonRpcResponse::error(request.id, JsonRpcError::invalid_params(msg))
        }
        Err(e) => JsonRpcResponse::error(
            request.id,
            JsonRpcError::tool_error(format!("Tool execution failed: {}", e)),
        ),
    }
}
