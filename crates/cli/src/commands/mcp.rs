use anyhow::Result;
use hookrelay_core::RelayConfig;
use hookrelay_mcp::run_mcp_server;
use hookrelay_service::RelayService;
use hookrelay_store::{spawn_sweeper, LifecycleStore};
use std::sync::Arc;

pub(crate) async fn run(config: RelayConfig) -> Result<()> {
    let store = Arc::new(LifecycleStore::new(config.ttl));
    let service = Arc::new(RelayService::with_webhook(Arc::clone(&store), config)?);
    let sweeper = spawn_sweeper(store, config.sweep_interval);

    tracing::info!(
        ttl_secs = config.ttl.as_secs(),
        sweep_interval_secs = config.sweep_interval.as_secs(),
        wait_timeout_secs = config.wait_timeout.as_secs(),
        "hookrelay ready"
    );

    tokio::select! {
        () = run_mcp_server(service) => {},
        () = shutdown_signal() => {
            tracing::info!("Shutdown signal received, in-flight requests are dropped");
        },
    }

    sweeper.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
