//! MCP (Model Context Protocol) server for hookrelay.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::option_if_let_else, reason = "if let is clearer")]
#![allow(clippy::let_underscore_must_use, reason = "Intentionally ignoring results")]
#![allow(let_underscore_drop, reason = "Intentionally dropping values")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::redundant_pub_crate, reason = "Explicit visibility")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::manual_let_else, reason = "if let is clearer")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]
#![allow(clippy::exhaustive_enums, reason = "MCP tools are stable")]
#![allow(clippy::exhaustive_structs, reason = "MCP types are stable")]
#![allow(clippy::single_call_fn, reason = "Handler functions improve readability")]

mod handlers;
mod tools;

use hookrelay_service::RelayService;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};

pub use tools::McpTool;

use handlers::handle_tool_call;
use tools::get_tools_json;

const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Deserialize)]
struct McpRequest {
    #[expect(dead_code, reason = "Required by JSON-RPC protocol but not used")]
    jsonrpc: String,
    id: Option<serde_json::Value>,
    method: String,
    #[serde(default)]
    params: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    pub id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

#[derive(Debug, Serialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
}

impl McpResponse {
    pub(crate) fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self { jsonrpc: "2.0".to_owned(), id, result: Some(result), error: None }
    }

    pub(crate) fn error(id: serde_json::Value, code: i32, message: String) -> Self {
        Self { jsonrpc: "2.0".to_owned(), id, result: None, error: Some(McpError { code, message }) }
    }
}

/// Serve MCP over the process's stdin/stdout until stdin closes.
pub async fn run_mcp_server(service: Arc<RelayService>) {
    tracing::info!("MCP server starting on stdio");
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(stdin, stdout, service).await;
    tracing::info!("MCP server stdin closed");
}

/// Line-delimited JSON-RPC loop over any reader/writer pair.
///
/// Every request runs on its own task, so a `send_message` that waits for its
/// delivery does not hold up the requests read after it. Responses go back
/// through one channel and are written here, one whole line at a time, in
/// completion order. After the reader closes, in-flight requests still get
/// their responses before this returns.
pub async fn serve<R, W>(reader: R, mut writer: W, service: Arc<RelayService>)
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (response_tx, mut response_rx) = mpsc::unbounded_channel::<McpResponse>();
    let mut response_tx = Some(response_tx);
    let mut lines = reader.lines();

    loop {
        tokio::select! {
            line = lines.next_line(), if response_tx.is_some() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        response_tx = None;
                        continue;
                    },
                    Err(e) => {
                        tracing::error!("MCP stdin read error: {}", e);
                        response_tx = None;
                        continue;
                    },
                };
                if let Some(tx) = &response_tx {
                    accept_line(&service, tx, &line);
                }
            },
            Some(response) = response_rx.recv() => {
                if let Err(e) = write_response(&mut writer, &response).await {
                    tracing::error!("MCP stdout write error: {}", e);
                    break;
                }
            },
            else => break,
        }
    }
}

fn accept_line(service: &Arc<RelayService>, response_tx: &UnboundedSender<McpResponse>, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    let request = match parse_request(line) {
        Ok(request) => request,
        Err(error_response) => {
            let _ = response_tx.send(error_response);
            return;
        },
    };

    let service = Arc::clone(service);
    let response_tx = response_tx.clone();
    tokio::spawn(async move {
        if let Some(response) = handle_request(&service, &request).await {
            let _ = response_tx.send(response);
        }
    });
}

fn parse_request(line: &str) -> Result<McpRequest, McpResponse> {
    let json_value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| McpResponse::error(json!(null), -32700, format!("Parse error: {e}")))?;

    serde_json::from_value(json_value.clone()).map_err(|e| {
        McpResponse::error(
            json_value.get("id").cloned().unwrap_or(json!(null)),
            -32600,
            format!("Invalid Request: {e}"),
        )
    })
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &McpResponse,
) -> std::io::Result<()> {
    let json = serde_json::to_string(response)?;
    writer.write_all(format!("{json}\n").as_bytes()).await?;
    writer.flush().await
}

async fn handle_request(service: &RelayService, req: &McpRequest) -> Option<McpResponse> {
    let id = match &req.id {
        Some(id) => id.clone(),
        None => {
            tracing::debug!(method = %req.method, "MCP notification received");
            return None;
        },
    };

    Some(match req.method.as_str() {
        "initialize" => McpResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": { "name": "hookrelay", "version": env!("CARGO_PKG_VERSION") }
            }),
        ),
        "tools/list" => McpResponse::success(id, get_tools_json()),
        "tools/call" => handle_tool_call(service, &req.params, id).await,
        "ping" => McpResponse::success(id, json!({})),
        _ => McpResponse::error(id, -32601, format!("Method not found: {}", req.method)),
    })
}
