use std::time::Duration;

use hookrelay_core::RequestStatus;
use hookrelay_service::{validate_message, DeliveryReport, RelayService};
use serde_json::json;

use super::{mcp_err, mcp_ok, mcp_text};

pub(super) async fn handle_send_message(
    service: &RelayService,
    args: &serde_json::Value,
) -> serde_json::Value {
    let webhook_url = args.get("webhook_url").and_then(|u| u.as_str()).unwrap_or("");
    let content = args.get("content").and_then(|c| c.as_str()).unwrap_or("");
    let username = args.get("username").and_then(|u| u.as_str());
    let avatar_url = args.get("avatar_url").and_then(|a| a.as_str());
    let wait = args.get("wait").and_then(serde_json::Value::as_bool).unwrap_or(true);
    let timeout = args.get("timeout_secs").and_then(serde_json::Value::as_u64).map(Duration::from_secs);

    let message = match validate_message(webhook_url, content, username, avatar_url) {
        Ok(m) => m,
        Err(e) => return mcp_err(e),
    };

    if !wait {
        let record = service.dispatch(message);
        return mcp_ok(&json!({
            "request_id": record.id,
            "status": record.status,
            "expires_at": record.expires_at,
        }));
    }

    match service.send_and_wait(message, timeout).await {
        DeliveryReport::Finished(record) => mcp_ok(&record),
        DeliveryReport::Pending { request_id } => mcp_ok(&json!({
            "request_id": request_id,
            "status": RequestStatus::Pending,
            "message": "Delivery still in progress, check again with get_request_status",
        })),
    }
}

pub(super) fn handle_get_request_status(
    service: &RelayService,
    args: &serde_json::Value,
) -> serde_json::Value {
    let id_str = args.get("request_id").and_then(|i| i.as_str()).unwrap_or("");
    if id_str.trim().is_empty() {
        return mcp_err("request_id is required and cannot be empty");
    }
    match service.lookup(id_str) {
        Some(record) => mcp_ok(&record),
        None => mcp_text(&format!("Request not found: {id_str}")),
    }
}
