use anyhow::Result;
use hookrelay_core::{RelayConfig, RequestStatus};
use hookrelay_service::{validate_message, DeliveryReport, RelayService};
use hookrelay_store::LifecycleStore;
use std::sync::Arc;
use std::time::Duration;

pub(crate) async fn run(
    config: RelayConfig,
    url: &str,
    content: &str,
    username: Option<&str>,
    avatar_url: Option<&str>,
    timeout: Option<Duration>,
) -> Result<()> {
    let message = validate_message(url, content, username, avatar_url)?;
    let store = Arc::new(LifecycleStore::new(config.ttl));
    let service = RelayService::with_webhook(store, config)?;

    match service.send_and_wait(message, timeout).await {
        DeliveryReport::Finished(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            if record.status != RequestStatus::Completed {
                let code = record.outcome.as_ref().map_or(0, |o| o.status_code);
                anyhow::bail!("delivery {} (status code {code})", record.status);
            }
            Ok(())
        },
        DeliveryReport::Pending { request_id } => {
            anyhow::bail!("delivery {request_id} did not finish before the wait deadline")
        },
    }
}
