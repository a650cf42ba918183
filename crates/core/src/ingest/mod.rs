//! Batch ingestion.
//!
//! - [`window`] - Incremental fetch window planning
//! - [`report`] - Per-symbol outcomes and run totals
//! - [`service`] - The sequential ingestion loop

pub mod report;
pub mod service;
pub mod window;


pub use report::{IngestReport, SkipReason, SymbolOutcome, SymbolStatus};
pub use service::{IngestService, IngestSettings};
pub use window::FetchWindow;
