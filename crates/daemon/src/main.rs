use anyhow::Context;
use clap::Parser;
use statusd::{serve, ApiKeys, AppState, Config, Registry};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();
    let config = Config::parse();

    let filter = config.env_filter()?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let api_keys = ApiKeys::new(config.api_keys.iter().cloned());
    if api_keys.is_empty() {
        tracing::warn!("no API keys configured, every protected request will be rejected");
    }
    let state = AppState::new(Registry::new(), api_keys);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(
        addr = %listener.local_addr()?,
        api_keys = state.api_keys.len(),
        "listening"
    );

    serve(listener, state, shutdown_signal()).await?;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
