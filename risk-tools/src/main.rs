use anyhow::Context;
use dotenv::dotenv;
use risk_client::{ClientConfig, Mode, RiskClient};
use risk_tools::{server, ToolRouter};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting risk tools server...");

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    let client = RiskClient::new(config).context("Failed to build risk client")?;

    match client.mode() {
        Mode::Demo => info!("Running in demo mode; set RISK_INTEL_API_KEY for live assessments"),
        Mode::Live => info!("Running in live mode"),
    }

    let router = ToolRouter::new(Arc::new(client));
    server::run_stdio(&router).await?;

    info!("Risk tools server stopped");
    Ok(())
}
