use dailybars_core::Config;
use dailybars_ingest::{init_tracing, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let config = Config::from_env().inspect_err(|e| tracing::error!("{}", e))?;
    let report = run(&config).await.inspect_err(|e| tracing::error!("{:#}", e))?;

    for (symbol, message) in &report.errors {
        tracing::warn!("{} failed: {}", symbol, message);
    }
    tracing::info!("{}", report.summary());
    Ok(())
}
