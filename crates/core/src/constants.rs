/// Provider name written to `instruments.provider`
pub const PROVIDER_NAME: &str = "Alpha Vantage";

/// Currency written to `instruments.currency`
pub const DEFAULT_CURRENCY: &str = "USD";

/// First date fetched for a symbol with no stored bars
pub const DEFAULT_START_DATE: &str = "2022-01-01";

pub const DEFAULT_OVERLAP_DAYS: i64 = 1;

/// Upper bound for `FETCH_OVERLAP_DAYS` (about ten years)
pub const MAX_OVERLAP_DAYS: i64 = 3650;

pub const DEFAULT_BATCH_SIZE: usize = 50;

pub const DEFAULT_SLEEP_SECONDS: u64 = 2;

pub const DEFAULT_DB_PATH: &str = "./db/dailybars.db";
