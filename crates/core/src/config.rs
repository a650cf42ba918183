//! Run configuration.
//!
//! Everything is read once from the process environment into an immutable
//! [`Config`] that is passed down to the stores and the ingest service.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;

use dailybars_market_data::provider::alpha_vantage::BASE_URL as ALPHA_VANTAGE_BASE_URL;
use dailybars_market_data::IntradayInterval;

use crate::constants::*;
use crate::errors::ConfigError;

/// A credential that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Which destination store the run writes to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreConfig {
    /// Hosted Postgres behind Supabase's REST layer.
    Supabase {
        url: String,
        service_role_key: Secret,
    },
    /// Local SQLite file.
    Sqlite { db_path: String },
}

impl StoreConfig {
    pub fn name(&self) -> &'static str {
        match self {
            StoreConfig::Supabase { .. } => "supabase",
            StoreConfig::Sqlite { .. } => "sqlite",
        }
    }
}

/// Daily bars straight from the provider, or intraday bars folded into
/// daily bars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Daily,
    Intraday,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(RunMode::Daily),
            "intraday" | "hours" => Ok(RunMode::Intraday),
            other => Err(format!("unknown mode '{}' (expected daily or intraday)", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub store: StoreConfig,
    pub alpha_vantage_api_key: Secret,
    pub alpha_vantage_base_url: String,
    pub overlap_days: i64,
    /// Rows per upsert statement/request
    pub batch_size: usize,
    /// Pause after each symbol that hit the provider
    pub sleep_between_symbols: Duration,
    pub mode: RunMode,
    pub intraday_interval: IntradayInterval,
    pub default_start_date: NaiveDate,
    pub symbols: Vec<String>,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key-value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::MissingKey(key.to_string()));

        let store = match get("INGEST_STORE")
            .unwrap_or_else(|| "supabase".to_string())
            .to_lowercase()
            .as_str()
        {
            "supabase" => StoreConfig::Supabase {
                url: require("SUPABASE_URL")?,
                service_role_key: Secret::new(require("SUPABASE_SERVICE_ROLE_KEY")?),
            },
            "sqlite" => StoreConfig::Sqlite {
                db_path: get("INGEST_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            },
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "INGEST_STORE".to_string(),
                    value: other.to_string(),
                    reason: "expected supabase or sqlite".to_string(),
                })
            }
        };

        let overlap_days: i64 = parse_or(
            "FETCH_OVERLAP_DAYS",
            get("FETCH_OVERLAP_DAYS"),
            DEFAULT_OVERLAP_DAYS,
        )?;
        if overlap_days < 0 {
            return Err(invalid(
                "FETCH_OVERLAP_DAYS",
                &overlap_days.to_string(),
                "must not be negative",
            ));
        }
        if overlap_days > MAX_OVERLAP_DAYS {
            return Err(invalid(
                "FETCH_OVERLAP_DAYS",
                &overlap_days.to_string(),
                &format!("must be at most {}", MAX_OVERLAP_DAYS),
            ));
        }

        let batch_size: usize = parse_or(
            "ALPHA_VANTAGE_BATCH_SIZE",
            get("ALPHA_VANTAGE_BATCH_SIZE"),
            DEFAULT_BATCH_SIZE,
        )?;
        if batch_size == 0 {
            return Err(invalid("ALPHA_VANTAGE_BATCH_SIZE", "0", "must be at least 1"));
        }

        let sleep_seconds: u64 = parse_or(
            "ALPHA_VANTAGE_SLEEP_SECONDS",
            get("ALPHA_VANTAGE_SLEEP_SECONDS"),
            DEFAULT_SLEEP_SECONDS,
        )?;

        let mode = match get("MODE") {
            Some(raw) => raw
                .parse::<RunMode>()
                .map_err(|reason| invalid("MODE", &raw, &reason))?,
            None => RunMode::default(),
        };

        let intraday_interval = match get("INTRADAY_INTERVAL") {
            Some(raw) => raw
                .parse::<IntradayInterval>()
                .map_err(|reason| invalid("INTRADAY_INTERVAL", &raw, &reason))?,
            None => IntradayInterval::default(),
        };

        let default_start_raw =
            get("DEFAULT_START_DATE").unwrap_or_else(|| DEFAULT_START_DATE.to_string());
        let default_start_date = NaiveDate::parse_from_str(&default_start_raw, "%Y-%m-%d")
            .map_err(|e| invalid("DEFAULT_START_DATE", &default_start_raw, &e.to_string()))?;

        let symbols = parse_symbols(get("SYMBOLS").as_deref(), get("SYMBOL").as_deref());
        if symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }

        Ok(Self {
            store,
            alpha_vantage_api_key: Secret::new(require("ALPHA_VANTAGE_API_KEY")?),
            alpha_vantage_base_url: get("ALPHA_VANTAGE_BASE_URL")
                .unwrap_or_else(|| ALPHA_VANTAGE_BASE_URL.to_string()),
            overlap_days,
            batch_size,
            sleep_between_symbols: Duration::from_secs(sleep_seconds),
            mode,
            intraday_interval,
            default_start_date,
            symbols,
        })
    }
}

/// `SYMBOLS` (comma separated) wins over `SYMBOL`. Blank entries are dropped.
pub fn parse_symbols(symbols: Option<&str>, symbol: Option<&str>) -> Vec<String> {
    let from_list: Vec<String> = symbols
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if !from_list.is_empty() {
        return from_list;
    }

    symbol
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| vec![s.to_string()])
        .unwrap_or_default()
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(value) => value
            .parse::<T>()
            .map_err(|e| invalid(key, &value, &e.to_string())),
        None => Ok(default),
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SUPABASE_URL", "https://example.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service-key"),
            ("ALPHA_VANTAGE_API_KEY", "av-key"),
            ("SYMBOLS", "AAPL"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&base())).unwrap();
        assert_eq!(config.overlap_days, 1);
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.sleep_between_symbols, Duration::from_secs(2));
        assert_eq!(config.mode, RunMode::Daily);
        assert_eq!(config.intraday_interval, IntradayInterval::SixtyMinutes);
        assert_eq!(
            config.default_start_date,
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
        );
        assert_eq!(config.alpha_vantage_base_url, "https://www.alphavantage.co/query");
        assert_eq!(config.store.name(), "supabase");
        assert_eq!(config.alpha_vantage_api_key.expose(), "av-key");
    }

    #[test]
    fn test_overrides() {
        let mut pairs = base();
        pairs.extend([
            ("FETCH_OVERLAP_DAYS", "3"),
            ("ALPHA_VANTAGE_BATCH_SIZE", "10"),
            ("ALPHA_VANTAGE_SLEEP_SECONDS", "15"),
            ("MODE", "hours"),
            ("INTRADAY_INTERVAL", "15min"),
            ("DEFAULT_START_DATE", "2023-06-01"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.overlap_days, 3);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.sleep_between_symbols, Duration::from_secs(15));
        assert_eq!(config.mode, RunMode::Intraday);
        assert_eq!(config.intraday_interval, IntradayInterval::FifteenMinutes);
        assert_eq!(
            config.default_start_date,
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
        );
    }

    #[test]
    fn test_sqlite_store_needs_no_supabase_credentials() {
        let pairs = [
            ("INGEST_STORE", "sqlite"),
            ("ALPHA_VANTAGE_API_KEY", "av-key"),
            ("SYMBOL", "IBM"),
        ];
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(
            config.store,
            StoreConfig::Sqlite {
                db_path: "./db/dailybars.db".to_string()
            }
        );
        assert_eq!(config.symbols, vec!["IBM".to_string()]);
    }

    #[test]
    fn test_missing_credentials() {
        let pairs = [("ALPHA_VANTAGE_API_KEY", "av-key"), ("SYMBOLS", "AAPL")];
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::MissingKey("SUPABASE_URL".to_string()));

        let pairs = [("INGEST_STORE", "sqlite"), ("SYMBOLS", "AAPL")];
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingKey("ALPHA_VANTAGE_API_KEY".to_string())
        );
    }

    #[test]
    fn test_no_symbols() {
        let pairs = [
            ("INGEST_STORE", "sqlite"),
            ("ALPHA_VANTAGE_API_KEY", "av-key"),
            ("SYMBOLS", " , ,"),
        ];
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::NoSymbols);
    }

    #[test]
    fn test_invalid_numbers_and_mode() {
        let mut pairs = base();
        pairs.push(("FETCH_OVERLAP_DAYS", "one"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "FETCH_OVERLAP_DAYS"));

        let mut pairs = base();
        pairs.push(("MODE", "weekly"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "MODE"));

        let mut pairs = base();
        pairs.push(("ALPHA_VANTAGE_BATCH_SIZE", "0"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_overlap_days_bounds() {
        let mut pairs = base();
        pairs.push(("FETCH_OVERLAP_DAYS", "-1"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = base();
        pairs.push(("FETCH_OVERLAP_DAYS", "200000000"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, ref reason, .. }
                if key == "FETCH_OVERLAP_DAYS" && reason == "must be at most 3650"
        ));

        let mut pairs = base();
        pairs.push(("FETCH_OVERLAP_DAYS", "3650"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.overlap_days, 3650);
    }

    #[test]
    fn test_parse_symbols() {
        assert_eq!(
            parse_symbols(Some("AAPL, ^GSPC ,,BTC-USD"), Some("IBM")),
            vec!["AAPL", "^GSPC", "BTC-USD"]
        );
        assert_eq!(parse_symbols(Some(""), Some(" IBM ")), vec!["IBM"]);
        assert!(parse_symbols(None, None).is_empty());
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = Config::from_lookup(lookup(&base())).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("service-key"));
        assert!(!rendered.contains("av-key"));
    }
}
