//! Alpha Vantage market data provider implementation.
//!
//! This module provides market data from Alpha Vantage API:
//! - Equities and ETFs via TIME_SERIES_DAILY / TIME_SERIES_INTRADAY
//! - Cryptocurrencies via DIGITAL_CURRENCY_DAILY / CRYPTO_INTRADAY
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute.
//! Pacing is the caller's job; this client issues exactly one request per call.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use num_traits::ToPrimitive;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{is_crypto_pair, DailyBar, IntradayBar, IntradayInterval};
use crate::provider::MarketDataProvider;

pub const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `outputsize=compact` returns roughly the last 100 data points.
const COMPACT_WINDOW_DAYS: i64 = 100;

const DAILY_SERIES_KEY: &str = "Time Series (Daily)";
const CRYPTO_DAILY_SERIES_KEY: &str = "Time Series (Digital Currency Daily)";

// Field prefixes. Crypto payloads use "1a. open (USD)" style keys, but the
// endpoint sometimes answers with the equity shape.
const OPEN_FIELDS: &[&str] = &["1. open", "1a. open", "1b. open"];
const HIGH_FIELDS: &[&str] = &["2. high", "2a. high", "2b. high"];
const LOW_FIELDS: &[&str] = &["3. low", "3a. low", "3b. low"];
const CLOSE_FIELDS: &[&str] = &["4. close", "4a. close", "4b. close"];
const VOLUME_FIELDS: &[&str] = &["5. volume"];

/// Alpha Vantage market data provider.
///
/// Supports equities, ETFs and `BASE-USD` crypto pairs.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// Top-level response shared by every time series endpoint.
///
/// The series itself lives under an endpoint specific key
/// (e.g. "Time Series (60min)"), so it is captured through `rest`.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(flatten)]
    rest: HashMap<String, serde_json::Value>,
}

/// One entry of a time series, keyed by field name.
#[derive(Debug, Deserialize)]
struct SeriesEntry {
    #[serde(flatten)]
    fields: HashMap<String, serde_json::Value>,
}

impl SeriesEntry {
    /// First parseable decimal among the fields matching `prefixes`, in
    /// prefix order.
    fn decimal(&self, prefixes: &[&str]) -> Option<Decimal> {
        prefixes.iter().find_map(|prefix| {
            self.fields
                .iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .find_map(|(_, value)| value.as_str().and_then(AlphaVantageProvider::parse_decimal))
        })
    }

    fn ohlc(&self) -> Option<(Decimal, Decimal, Decimal, Decimal)> {
        Some((
            self.decimal(OPEN_FIELDS)?,
            self.decimal(HIGH_FIELDS)?,
            self.decimal(LOW_FIELDS)?,
            self.decimal(CLOSE_FIELDS)?,
        ))
    }

    fn volume(&self) -> Option<i64> {
        self.decimal(VOLUME_FIELDS)
            .and_then(|v| v.trunc().to_i64())
    }
}

// ============================================================================
// AlphaVantageProvider implementation
// ============================================================================

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL.to_string())
    }

    /// Create a provider pointing at a different endpoint (proxies, tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Make a request to the Alpha Vantage API.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", &self.api_key));

        let url = reqwest::Url::parse_with_params(&self.base_url, &all_params).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build URL: {}", e),
            }
        })?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    MarketDataError::Network(e)
                }
            })?;

        Self::check_status(response.status())?;

        Ok(response.text().await?)
    }

    /// Map the HTTP status of a response before its body is read.
    fn check_status(status: reqwest::StatusCode) -> Result<(), MarketDataError> {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        Ok(())
    }

    /// Check for API-level errors in the response.
    fn check_api_error(
        error_message: &Option<String>,
        note: &Option<String>,
        information: &Option<String>,
    ) -> Result<(), MarketDataError> {
        if let Some(ref msg) = error_message {
            if msg.contains("Invalid API call") || msg.contains("not found") {
                return Err(MarketDataError::SymbolNotFound(msg.clone()));
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: msg.clone(),
            });
        }

        // "Note" usually indicates rate limiting
        if let Some(ref msg) = note {
            if Self::is_rate_limit_message(msg) {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage note: {}", msg);
        }

        // "Information" replaces the payload (premium-only parameters, demo key, quota)
        if let Some(ref msg) = information {
            if Self::is_rate_limit_message(msg) {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: msg.clone(),
            });
        }

        Ok(())
    }

    fn is_rate_limit_message(msg: &str) -> bool {
        let lower = msg.to_lowercase();
        lower.contains("api call frequency") || lower.contains("rate limit")
    }

    /// Parse a date string in YYYY-MM-DD format.
    fn parse_date(date_str: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
    }

    /// Parse an intraday timestamp ("2025-09-22 13:00:00").
    fn parse_timestamp(ts: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").ok()
    }

    /// Parse a decimal value from a string.
    fn parse_decimal(s: &str) -> Option<Decimal> {
        Decimal::from_str(s.trim()).ok()
    }

    /// `compact` when the window starts within 100 days of its end, else `full`.
    fn outputsize_for(since: NaiveDate, until: NaiveDate) -> &'static str {
        if (until - since).num_days() <= COMPACT_WINDOW_DAYS {
            "compact"
        } else {
            "full"
        }
    }

    /// Split `BTC-USD` into `("BTC", "USD")`.
    fn split_crypto_pair(ticker: &str) -> Option<(&str, &str)> {
        if !is_crypto_pair(ticker) {
            return None;
        }
        ticker.split_once('-')
    }

    fn malformed(message: String) -> MarketDataError {
        MarketDataError::MalformedPayload {
            provider: PROVIDER_ID.to_string(),
            message,
        }
    }

    /// Decode the envelope, surface API errors and extract the series under
    /// `series_key`.
    fn decode_series<T: DeserializeOwned>(
        body: &str,
        series_key: &str,
        ticker: &str,
    ) -> Result<HashMap<String, T>, MarketDataError> {
        let mut envelope: ApiEnvelope = serde_json::from_str(body)
            .map_err(|e| Self::malformed(format!("Failed to parse response: {}", e)))?;

        Self::check_api_error(
            &envelope.error_message,
            &envelope.note,
            &envelope.information,
        )?;

        let empty = || MarketDataError::EmptyResponse {
            provider: PROVIDER_ID.to_string(),
            symbol: ticker.to_string(),
        };

        match envelope.rest.remove(series_key) {
            Some(serde_json::Value::Object(map)) if !map.is_empty() => {
                serde_json::from_value(serde_json::Value::Object(map)).map_err(|e| {
                    Self::malformed(format!("Unexpected entry in {}: {}", series_key, e))
                })
            }
            Some(serde_json::Value::Object(_)) | None => Err(empty()),
            Some(other) => Err(Self::malformed(format!(
                "Expected an object under {}, got {}",
                series_key, other
            ))),
        }
    }

    /// Parse a daily time series payload into bars sorted by date.
    ///
    /// Rows with an unparseable date or missing OHLC values are skipped.
    fn parse_daily_series(
        body: &str,
        series_key: &str,
        ticker: &str,
    ) -> Result<Vec<DailyBar>, MarketDataError> {
        let series: HashMap<String, SeriesEntry> = Self::decode_series(body, series_key, ticker)?;

        let mut bars: Vec<DailyBar> = series
            .into_iter()
            .filter_map(|(date_str, entry)| {
                let Some(date) = Self::parse_date(&date_str) else {
                    warn!("Skipping {} row with invalid date '{}'", ticker, date_str);
                    return None;
                };
                let Some((open, high, low, close)) = entry.ohlc() else {
                    warn!("Skipping {} at {} due to missing OHLC data", ticker, date_str);
                    return None;
                };
                Some(DailyBar::new(
                    date,
                    open,
                    high,
                    low,
                    close,
                    entry.volume().unwrap_or(0),
                ))
            })
            .collect();

        // Sort by date ascending
        bars.sort_by_key(|bar| bar.date);
        Ok(bars)
    }

    /// Parse an intraday time series payload into bars sorted by timestamp.
    fn parse_intraday_series(
        body: &str,
        series_key: &str,
        ticker: &str,
    ) -> Result<Vec<IntradayBar>, MarketDataError> {
        let series: HashMap<String, SeriesEntry> = Self::decode_series(body, series_key, ticker)?;

        let mut bars: Vec<IntradayBar> = series
            .into_iter()
            .filter_map(|(ts, entry)| {
                let Some(timestamp) = Self::parse_timestamp(&ts) else {
                    warn!("Skipping {} row with invalid timestamp '{}'", ticker, ts);
                    return None;
                };
                let Some((open, high, low, close)) = entry.ohlc() else {
                    warn!("Skipping {} at {} due to missing OHLC data", ticker, ts);
                    return None;
                };
                Some(IntradayBar {
                    timestamp,
                    open,
                    high,
                    low,
                    close,
                    volume: entry.volume(),
                })
            })
            .collect();

        bars.sort_by_key(|bar| bar.timestamp);
        Ok(bars)
    }

    /// Filter bars by date range (inclusive on both ends).
    fn filter_by_date_range(bars: Vec<DailyBar>, since: NaiveDate, until: NaiveDate) -> Vec<DailyBar> {
        bars.into_iter()
            .filter(|b| b.date >= since && b.date <= until)
            .collect()
    }

    fn filter_by_time_range(
        bars: Vec<IntradayBar>,
        since: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Vec<IntradayBar> {
        bars.into_iter()
            .filter(|b| b.timestamp >= since && b.timestamp <= until)
            .collect()
    }

    /// Fetch equity/ETF bars using TIME_SERIES_DAILY endpoint.
    async fn fetch_equity_daily(
        &self,
        ticker: &str,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<DailyBar>, MarketDataError> {
        let outputsize = Self::outputsize_for(since, until);
        let params = [
            ("function", "TIME_SERIES_DAILY"),
            ("symbol", ticker),
            ("outputsize", outputsize),
        ];

        let text = self.fetch(&params).await?;
        Self::parse_daily_series(&text, DAILY_SERIES_KEY, ticker)
    }

    /// Fetch crypto bars using DIGITAL_CURRENCY_DAILY endpoint.
    async fn fetch_crypto_daily(
        &self,
        ticker: &str,
        base: &str,
        market: &str,
    ) -> Result<Vec<DailyBar>, MarketDataError> {
        let params = [
            ("function", "DIGITAL_CURRENCY_DAILY"),
            ("symbol", base),
            ("market", market),
        ];

        let text = self.fetch(&params).await?;
        Self::parse_daily_series(&text, CRYPTO_DAILY_SERIES_KEY, ticker)
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_daily(
        &self,
        ticker: &str,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<DailyBar>, MarketDataError> {
        let bars = match Self::split_crypto_pair(ticker) {
            Some((base, market)) => self.fetch_crypto_daily(ticker, base, market).await?,
            None => self.fetch_equity_daily(ticker, since, until).await?,
        };

        let total = bars.len();
        let bars = Self::filter_by_date_range(bars, since, until);

        debug!(
            "Alpha Vantage: fetched {} daily bars for {} ({} inside {}..={})",
            total,
            ticker,
            bars.len(),
            since,
            until
        );

        Ok(bars)
    }

    async fn fetch_intraday(
        &self,
        ticker: &str,
        interval: IntradayInterval,
        since: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<IntradayBar>, MarketDataError> {
        let interval_str = interval.as_str();

        let (text, series_key) = match Self::split_crypto_pair(ticker) {
            Some((base, market)) => {
                let params = [
                    ("function", "CRYPTO_INTRADAY"),
                    ("symbol", base),
                    ("market", market),
                    ("interval", interval_str),
                ];
                (
                    self.fetch(&params).await?,
                    format!("Time Series Crypto ({})", interval_str),
                )
            }
            None => {
                let params = [
                    ("function", "TIME_SERIES_INTRADAY"),
                    ("symbol", ticker),
                    ("interval", interval_str),
                    ("outputsize", "compact"),
                ];
                (
                    self.fetch(&params).await?,
                    format!("Time Series ({})", interval_str),
                )
            }
        };

        let bars = Self::parse_intraday_series(&text, &series_key, ticker)?;
        let bars = Self::filter_by_time_range(bars, since, until);

        debug!(
            "Alpha Vantage: fetched {} {} bars for {}",
            bars.len(),
            interval_str,
            ticker
        );

        Ok(bars)
    }
}
