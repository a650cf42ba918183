//! Dailybars Core - Domain entities, services, and traits.
//!
//! This crate contains the ingestion logic. It is storage-agnostic and
//! defines traits that are implemented by the `storage-sqlite` and
//! `storage-supabase` crates.

pub mod bars;
pub mod config;
pub mod constants;
pub mod errors;
pub mod ingest;
pub mod instruments;

pub use bars::{aggregate_intraday_to_daily, BarRecord, BarRepositoryTrait};
pub use config::{Config, RunMode, Secret, StoreConfig};
pub use ingest::{FetchWindow, IngestReport, IngestService, IngestSettings, SymbolOutcome};
pub use instruments::{Instrument, InstrumentRepositoryTrait, NewInstrument};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
