//! Ingestion service.
//!
//! # Architecture
//!
//! ```text
//! IngestService
//!       │
//!       ├─► resolve_symbol (static proxy table)
//!       ├─► MarketDataProvider (fetch bars)
//!       ├─► InstrumentRepositoryTrait (find / create instrument)
//!       └─► BarRepositoryTrait (latest date, upsert bars)
//! ```
//!
//! Symbols are processed strictly one after another. A fixed pause
//! separates consecutive provider calls; there is none after the last one.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use log::{debug, error, info, warn};

use dailybars_market_data::{
    resolve_symbol, DailyBar, IntradayInterval, MarketDataProvider, ResolutionSource,
    ResolvedSymbol,
};

use super::report::{IngestReport, SkipReason, SymbolOutcome};
use super::window::FetchWindow;
use crate::bars::{aggregate_intraday_to_daily, BarRepositoryTrait};
use crate::config::{Config, RunMode};
use crate::errors::Result;
use crate::instruments::{InstrumentRepositoryTrait, NewInstrument};

/// Knobs the service needs from [`Config`].
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub overlap_days: i64,
    pub default_start_date: NaiveDate,
    pub sleep_between_symbols: Duration,
    pub mode: RunMode,
    pub intraday_interval: IntradayInterval,
}

impl From<&Config> for IngestSettings {
    fn from(config: &Config) -> Self {
        Self {
            overlap_days: config.overlap_days,
            default_start_date: config.default_start_date,
            sleep_between_symbols: config.sleep_between_symbols,
            mode: config.mode,
            intraday_interval: config.intraday_interval,
        }
    }
}

/// Runs the per-symbol pipeline: resolve, plan window, fetch, ensure
/// instrument, upsert bars.
pub struct IngestService {
    provider: Arc<dyn MarketDataProvider>,
    instrument_repository: Arc<dyn InstrumentRepositoryTrait>,
    bar_repository: Arc<dyn BarRepositoryTrait>,
    settings: IngestSettings,
}

impl IngestService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        instrument_repository: Arc<dyn InstrumentRepositoryTrait>,
        bar_repository: Arc<dyn BarRepositoryTrait>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            provider,
            instrument_repository,
            bar_repository,
            settings,
        }
    }

    /// Process every symbol once, using the current UTC time.
    pub async fn run(&self, symbols: &[String]) -> Result<IngestReport> {
        self.run_at(symbols, Utc::now().naive_utc()).await
    }

    /// Process every symbol once as of `now`.
    ///
    /// Per-symbol failures are recorded in the report and the run moves on.
    /// A fatal error (rejected store credentials) stops the run and is
    /// returned, since every remaining symbol would fail the same way.
    pub async fn run_at(&self, symbols: &[String], now: NaiveDateTime) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut provider_called = false;
        let total = symbols.len();

        info!("Starting ingestion for {} symbols: {:?}", total, symbols);

        for (idx, symbol) in symbols.iter().enumerate() {
            let resolved = resolve_symbol(symbol);

            if !seen.insert(resolved.symbol.clone()) {
                warn!("Skipping duplicate symbol {}", resolved.symbol);
                report.add_outcome(SymbolOutcome::skipped(
                    &resolved.symbol,
                    &resolved.ticker,
                    SkipReason::Duplicate,
                ));
                continue;
            }

            if !resolved.is_supported() {
                info!(
                    "Skipping {}: not supported by {}",
                    resolved.symbol,
                    self.provider.id()
                );
                report.add_outcome(SymbolOutcome::skipped(
                    &resolved.symbol,
                    &resolved.ticker,
                    SkipReason::UnsupportedByProvider {
                        ticker: resolved.ticker.clone(),
                    },
                ));
                continue;
            }

            if provider_called && !self.settings.sleep_between_symbols.is_zero() {
                debug!(
                    "Sleeping {:?} before next symbol",
                    self.settings.sleep_between_symbols
                );
                tokio::time::sleep(self.settings.sleep_between_symbols).await;
            }
            provider_called = true;

            if let ResolutionSource::Proxy(rule) = resolved.source {
                info!(
                    "Mapping {} -> {} ({})",
                    resolved.symbol, resolved.ticker, rule.description
                );
            }
            info!(
                "[{}/{}] Processing {} (fetch {})",
                idx + 1,
                total,
                resolved.symbol,
                resolved.ticker
            );

            let outcome = match self.ingest_symbol(&resolved, now).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_fatal() => {
                    error!(
                        "Aborting run at {} (via {}): {}",
                        resolved.symbol, resolved.ticker, e
                    );
                    return Err(e);
                }
                Err(e) => {
                    if e.is_transient() {
                        warn!(
                            "Failed {} (via {}): {}. The next run will retry it",
                            resolved.symbol, resolved.ticker, e
                        );
                    } else {
                        error!(
                            "Failed {} (via {}): {}",
                            resolved.symbol, resolved.ticker, e
                        );
                    }
                    SymbolOutcome::failed(&resolved.symbol, &resolved.ticker, e.to_string())
                }
            };
            report.add_outcome(outcome);
        }

        info!("Completed: {}", report.summary());
        Ok(report)
    }

    async fn ingest_symbol(
        &self,
        resolved: &ResolvedSymbol,
        now: NaiveDateTime,
    ) -> Result<SymbolOutcome> {
        let existing = self
            .instrument_repository
            .find_by_symbol(&resolved.symbol)
            .await?;

        let latest = match &existing {
            Some(instrument) => self.bar_repository.latest_bar_date(&instrument.id).await?,
            None => None,
        };

        let window = FetchWindow::plan(
            latest,
            self.settings.overlap_days,
            self.settings.default_start_date,
            now.date(),
        );
        match latest {
            Some(latest) => debug!(
                "Last stored date for {}: {}, fetching from {}",
                resolved.symbol, latest, window.since
            ),
            None => debug!(
                "No stored bars for {}, fetching from {}",
                resolved.symbol, window.since
            ),
        }

        let bars = self.fetch_bars(&resolved.ticker, &window, now).await?;
        info!(
            "Fetched {} bars for {} (storing under {})",
            bars.len(),
            resolved.ticker,
            resolved.symbol
        );

        if bars.is_empty() {
            return Ok(SymbolOutcome::success(
                &resolved.symbol,
                &resolved.ticker,
                window,
                existing.map(|instrument| instrument.id),
                0,
            ));
        }

        let instrument = match existing {
            Some(instrument) => instrument,
            None => {
                let created = self
                    .instrument_repository
                    .get_or_create(NewInstrument::from_resolved(resolved))
                    .await?;
                info!("Created instrument {} for {}", created.id, created.symbol);
                created
            }
        };

        let upserted = self.bar_repository.upsert_bars(&instrument, &bars).await?;
        info!("Upserted {} bars for {}", upserted, instrument.symbol);

        Ok(SymbolOutcome::success(
            &resolved.symbol,
            &resolved.ticker,
            window,
            Some(instrument.id),
            upserted,
        ))
    }

    async fn fetch_bars(
        &self,
        ticker: &str,
        window: &FetchWindow,
        now: NaiveDateTime,
    ) -> Result<Vec<DailyBar>> {
        match self.settings.mode {
            RunMode::Daily => Ok(self
                .provider
                .fetch_daily(ticker, window.since, window.until)
                .await?),
            RunMode::Intraday => {
                let intraday = self
                    .provider
                    .fetch_intraday(
                        ticker,
                        self.settings.intraday_interval,
                        window.since_start_of_day(),
                        now,
                    )
                    .await?;
                debug!(
                    "Aggregating {} {} bars for {}",
                    intraday.len(),
                    self.settings.intraday_interval,
                    ticker
                );
                let mut daily = aggregate_intraday_to_daily(&intraday);
                // Compact intraday history may start mid-day. A first day later
                // than the window start is likely cut short, so it is not stored.
                if daily.first().is_some_and(|bar| bar.date > window.since) {
                    let dropped = daily.remove(0);
                    debug!(
                        "Dropping partial day {} for {}: intraday history starts after {}",
                        dropped.date, ticker, window.since
                    );
                }
                Ok(daily)
            }
        }
    }
}
