use serde_json::json;

/// All MCP tools exposed by this server.
/// Using an enum ensures compile-time safety for tool names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpTool {
    SendMessage,
    GetRequestStatus,
    RelayStats,
}

impl McpTool {
    /// Parse tool name from JSON-RPC request.
    /// Returns None for unknown tools (caller must handle error).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "send_message" => Some(Self::SendMessage),
            "get_request_status" => Some(Self::GetRequestStatus),
            "relay_stats" => Some(Self::RelayStats),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match *self {
            Self::SendMessage => "send_message",
            Self::GetRequestStatus => "get_request_status",
            Self::RelayStats => "relay_stats",
        }
    }

    pub const ALL: [Self; 3] = [Self::SendMessage, Self::GetRequestStatus, Self::RelayStats];
}

/// Returns the JSON schema for all MCP tools.
pub fn get_tools_json() -> serde_json::Value {
    json!({
        "tools": [
            {
                "name": "send_message",
                "description": "Send a message to a webhook URL. By default waits for the delivery result; with wait=false returns a request_id to check later with get_request_status.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "webhook_url": { "type": "string", "description": "Webhook endpoint (http or https)" },
                        "content": { "type": "string", "description": "Message text (max 2000 characters)" },
                        "username": { "type": "string", "description": "Display name override for the message" },
                        "avatar_url": { "type": "string", "description": "Avatar image URL override" },
                        "wait": { "type": "boolean", "default": true, "description": "Wait for the delivery result" },
                        "timeout_secs": { "type": "integer", "description": "Maximum seconds to wait (capped by server)" }
                    },
                    "required": ["webhook_url", "content"]
                }
            },
            {
                "name": "get_request_status",
                "description": "Look up a previously sent message by request_id. Records expire after a fixed time-to-live.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "request_id": { "type": "string", "description": "ID returned by send_message" }
                    },
                    "required": ["request_id"]
                }
            },
            {
                "name": "relay_stats",
                "description": "Count tracked requests by status",
                "inputSchema": { "type": "object", "properties": {} }
            }
        ]
    })
}
