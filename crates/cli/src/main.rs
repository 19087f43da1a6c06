use anyhow::Result;
use clap::{Parser, Subcommand};
use hookrelay_core::{env_parse_with_default, RelayConfig};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "hookrelay")]
#[command(version, about = "Relay messages to HTTP webhooks for MCP clients", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdio
    Mcp,
    /// Send one message and print the delivery record
    Send {
        /// Webhook endpoint (http or https)
        #[arg(short, long)]
        url: String,
        /// Message text
        content: String,
        /// Display name override
        #[arg(long)]
        username: Option<String>,
        /// Avatar image URL override
        #[arg(long)]
        avatar_url: Option<String>,
        /// Seconds to wait for the endpoint before giving up
        #[arg(short, long)]
        timeout_secs: Option<u64>,
    },
}

pub(crate) fn config_from_env() -> RelayConfig {
    let defaults = RelayConfig::default();
    RelayConfig {
        ttl: Duration::from_secs(env_parse_with_default("HOOKRELAY_TTL_SECS", defaults.ttl.as_secs())),
        sweep_interval: Duration::from_secs(env_parse_with_default(
            "HOOKRELAY_SWEEP_INTERVAL_SECS",
            defaults.sweep_interval.as_secs(),
        )),
        poll_interval: Duration::from_millis(env_parse_with_default(
            "HOOKRELAY_POLL_INTERVAL_MS",
            u64::try_from(defaults.poll_interval.as_millis()).unwrap_or(u64::MAX),
        )),
        wait_timeout: Duration::from_secs(env_parse_with_default(
            "HOOKRELAY_WAIT_TIMEOUT_SECS",
            defaults.wait_timeout.as_secs(),
        )),
        dispatch_timeout: Duration::from_secs(env_parse_with_default(
            "HOOKRELAY_DISPATCH_TIMEOUT_SECS",
            defaults.dispatch_timeout.as_secs(),
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP protocol, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = config_from_env();

    match cli.command {
        Commands::Mcp => commands::mcp::run(config).await,
        Commands::Send { url, content, username, avatar_url, timeout_secs } => {
            commands::send::run(
                config,
                &url,
                &content,
                username.as_deref(),
                avatar_url.as_deref(),
                timeout_secs.map(Duration::from_secs),
            )
            .await
        },
    }
}
