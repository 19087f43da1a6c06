mod relay;

use hookrelay_service::RelayService;
use serde::Serialize;
use serde_json::json;
use std::fmt::Display;

use crate::tools::McpTool;
use crate::McpResponse;

pub(crate) fn mcp_ok<T: Serialize>(data: &T) -> serde_json::Value {
    match serde_json::to_string_pretty(data) {
        Ok(json) => json!({ "content": [{ "type": "text", "text": json }] }),
        Err(e) => {
            json!({ "content": [{ "type": "text", "text": format!("Serialization error: {}", e) }], "isError": true })
        },
    }
}

pub(crate) fn mcp_text(text: &str) -> serde_json::Value {
    json!({ "content": [{ "type": "text", "text": text }] })
}

pub(crate) fn mcp_err(msg: impl Display) -> serde_json::Value {
    json!({ "content": [{ "type": "text", "text": format!("Error: {}", msg) }], "isError": true })
}

pub async fn handle_tool_call(
    service: &RelayService,
    params: &serde_json::Value,
    id: serde_json::Value,
) -> McpResponse {
    let tool_name_str = params.get("name").and_then(|n| n.as_str()).unwrap_or("");
    let args = params.get("arguments").cloned().unwrap_or(json!({}));

    let tool = match McpTool::parse(tool_name_str) {
        Some(t) => t,
        None => {
            let available: Vec<&str> = McpTool::ALL.iter().map(McpTool::name).collect();
            return McpResponse::error(
                id,
                -32602,
                format!("Unknown tool: '{tool_name_str}'. Available: {}", available.join(", ")),
            );
        },
    };

    let result = match tool {
        McpTool::SendMessage => relay::handle_send_message(service, &args).await,
        McpTool::GetRequestStatus => relay::handle_get_request_status(service, &args),
        McpTool::RelayStats => mcp_ok(&service.stats()),
    };

    McpResponse::success(id, result)
}
