// =============================================================================
// Ingest Result Types
// =============================================================================

use super::window::FetchWindow;

/// Status of a single symbol after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolStatus {
    /// Fetched and stored (possibly zero bars).
    Success,
    /// Not sent to the provider.
    Skipped,
    /// Provider or store failure. The run moved on to the next symbol.
    Failed,
}

/// Reason why a symbol was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Index or future without a proxy ticker.
    UnsupportedByProvider { ticker: String },
    /// Listed more than once in the configured symbols.
    Duplicate,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnsupportedByProvider { ticker } => {
                write!(f, "Unsupported by provider ({})", ticker)
            }
            SkipReason::Duplicate => write!(f, "Duplicate symbol"),
        }
    }
}

/// Result of processing one configured symbol.
#[derive(Debug, Clone)]
pub struct SymbolOutcome {
    /// Symbol as configured (normalized)
    pub symbol: String,
    /// Ticker sent to the provider
    pub ticker: String,
    pub status: SymbolStatus,
    pub bars_upserted: usize,
    pub window: Option<FetchWindow>,
    pub instrument_id: Option<String>,
    pub skip_reason: Option<SkipReason>,
    pub error: Option<String>,
}

impl SymbolOutcome {
    pub fn success(
        symbol: &str,
        ticker: &str,
        window: FetchWindow,
        instrument_id: Option<String>,
        bars_upserted: usize,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            ticker: ticker.to_string(),
            status: SymbolStatus::Success,
            bars_upserted,
            window: Some(window),
            instrument_id,
            skip_reason: None,
            error: None,
        }
    }

    pub fn skipped(symbol: &str, ticker: &str, reason: SkipReason) -> Self {
        Self {
            symbol: symbol.to_string(),
            ticker: ticker.to_string(),
            status: SymbolStatus::Skipped,
            bars_upserted: 0,
            window: None,
            instrument_id: None,
            skip_reason: Some(reason),
            error: None,
        }
    }

    pub fn failed(symbol: &str, ticker: &str, error: String) -> Self {
        Self {
            symbol: symbol.to_string(),
            ticker: ticker.to_string(),
            status: SymbolStatus::Failed,
            bars_upserted: 0,
            window: None,
            instrument_id: None,
            skip_reason: None,
            error: Some(error),
        }
    }
}

/// Aggregate result of one run.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Number of symbols fetched and stored.
    pub succeeded: usize,
    /// Number of symbols that failed.
    pub failed: usize,
    /// Number of symbols that were skipped.
    pub skipped: usize,
    /// Total rows upserted.
    pub bars_upserted: usize,
    /// Per-symbol outcomes, in processing order.
    pub outcomes: Vec<SymbolOutcome>,
    /// (symbol, message) for each failed symbol.
    pub errors: Vec<(String, String)>,
    /// (symbol, reason) for each skipped symbol.
    pub skipped_reasons: Vec<(String, SkipReason)>,
}

impl IngestReport {
    /// Check if the run was fully successful (no failures).
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        if self.is_success() {
            format!(
                "Upserted {} bars for {} symbols ({} skipped)",
                self.bars_upserted, self.succeeded, self.skipped
            )
        } else {
            format!(
                "Upserted {} bars for {} symbols with {} failures ({} skipped)",
                self.bars_upserted, self.succeeded, self.failed, self.skipped
            )
        }
    }

    /// Add the outcome for a single symbol.
    pub fn add_outcome(&mut self, outcome: SymbolOutcome) {
        match outcome.status {
            SymbolStatus::Success => {
                self.succeeded += 1;
                self.bars_upserted += outcome.bars_upserted;
            }
            SymbolStatus::Skipped => {
                self.skipped += 1;
                if let Some(reason) = outcome.skip_reason.clone() {
                    self.skipped_reasons.push((outcome.symbol.clone(), reason));
                }
            }
            SymbolStatus::Failed => {
                self.failed += 1;
                if let Some(err) = outcome.error.clone() {
                    self.errors.push((outcome.symbol.clone(), err));
                }
            }
        }
        self.outcomes.push(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window() -> FetchWindow {
        FetchWindow {
            since: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            until: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        }
    }

    #[test]
    fn test_report_totals() {
        let mut report = IngestReport::default();
        report.add_outcome(SymbolOutcome::success("AAPL", "AAPL", window(), Some("a".into()), 20));
        report.add_outcome(SymbolOutcome::success("^GSPC", "SPY", window(), Some("b".into()), 5));
        report.add_outcome(SymbolOutcome::skipped(
            "^DJI",
            "^DJI",
            SkipReason::UnsupportedByProvider {
                ticker: "^DJI".into(),
            },
        ));
        report.add_outcome(SymbolOutcome::failed("NOPE", "NOPE", "Symbol not found".into()));

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.bars_upserted, 25);
        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.errors, vec![("NOPE".to_string(), "Symbol not found".to_string())]);
        assert!(!report.is_success());
        assert_eq!(
            report.summary(),
            "Upserted 25 bars for 2 symbols with 1 failures (1 skipped)"
        );
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(
            SkipReason::UnsupportedByProvider {
                ticker: "CL=F".into()
            }
            .to_string(),
            "Unsupported by provider (CL=F)"
        );
        assert_eq!(SkipReason::Duplicate.to_string(), "Duplicate symbol");
    }
}
