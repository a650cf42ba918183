use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dailybars_core::bars::BarRepositoryTrait;
use dailybars_core::instruments::InstrumentRepositoryTrait;
use dailybars_core::{Config, IngestReport, IngestService, StoreConfig};
use dailybars_market_data::AlphaVantageProvider;
use dailybars_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, BarRepository, InstrumentRepository,
};
use dailybars_storage_supabase::{
    PostgrestClient, SupabaseBarRepository, SupabaseInstrumentRepository,
};

/// Repositories for the configured destination store.
pub struct Stores {
    pub instruments: Arc<dyn InstrumentRepositoryTrait>,
    pub bars: Arc<dyn BarRepositoryTrait>,
}

/// Install the global subscriber. `log` records from the library crates are
/// forwarded into it.
pub fn init_tracing() -> anyhow::Result<()> {
    let log_format = std::env::var("INGEST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("INGEST_LOG_FILE")
        .ok()
        .filter(|path| !path.trim().is_empty());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let ansi = log_file.is_none();
    let writer = match &log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(writer))
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init()?;
    }
    Ok(())
}

/// Open the destination store. For SQLite this creates the file, applies
/// migrations and starts the writer task, so it must run inside a runtime.
pub fn build_stores(store: &StoreConfig, batch_size: usize) -> anyhow::Result<Stores> {
    match store {
        StoreConfig::Sqlite { db_path } => {
            let db_path = init(db_path)?;
            tracing::info!("Database path in use: {}", db_path);
            let pool = create_pool(&db_path)?;
            run_migrations(&pool)?;
            let writer = spawn_writer((*pool).clone());

            Ok(Stores {
                instruments: Arc::new(InstrumentRepository::new(
                    Arc::clone(&pool),
                    writer.clone(),
                )),
                bars: Arc::new(BarRepository::with_batch_size(pool, writer, batch_size)),
            })
        }
        StoreConfig::Supabase {
            url,
            service_role_key,
        } => {
            let client = Arc::new(PostgrestClient::new(url, service_role_key.expose())?);
            tracing::info!("Writing to Supabase project {}", url);

            Ok(Stores {
                instruments: Arc::new(SupabaseInstrumentRepository::new(Arc::clone(&client))),
                bars: Arc::new(SupabaseBarRepository::with_batch_size(client, batch_size)),
            })
        }
    }
}

pub fn build_service(config: &Config, stores: Stores) -> IngestService {
    let provider = Arc::new(AlphaVantageProvider::with_base_url(
        config.alpha_vantage_api_key.expose().to_string(),
        config.alpha_vantage_base_url.clone(),
    ));

    IngestService::new(provider, stores.instruments, stores.bars, config.into())
}

/// Run one ingestion pass. Errors returned here end the process with a
/// non-zero status; per-symbol failures are inside the report.
pub async fn run(config: &Config) -> anyhow::Result<IngestReport> {
    tracing::info!(
        "Starting {:?} ingestion into {} for {} symbols",
        config.mode,
        config.store.name(),
        config.symbols.len()
    );

    let stores = build_stores(&config.store, config.batch_size)
        .with_context(|| format!("Failed to initialise {} store", config.store.name()))?;
    let service = build_service(config, stores);

    let report = service
        .run(&config.symbols)
        .await
        .context("Ingestion aborted")?;
    Ok(report)
}
