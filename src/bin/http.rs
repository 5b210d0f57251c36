use tracing_subscriber::EnvFilter;
use workout_tracker::{AppConfig, http_api};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env()?;
    let store = config.open_store()?;
    let state = http_api::AppState::new(store);

    tracing::info!(
        addr = %config.http_addr,
        backend = ?config.backend,
        data_dir = %config.data_dir.display(),
        "workout-tracker HTTP API listening"
    );
    http_api::serve(config.http_addr, state).await?;
    Ok(())
}
