//! SQLite storage implementation for dailybars.
//!
//! This crate implements the repository traits defined in `dailybars-core`
//! using Diesel ORM with SQLite. It contains:
//! - Database connection pooling and management
//! - Diesel migrations for the `instruments` and `ohlcv_data` tables
//! - Repository implementations for instruments and daily bars
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! ```text
//!          core (ingest service)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!         pool ────┴──── write actor
//!                  │
//!                  ▼
//!              SQLite DB
//! ```
//!
//! Reads go through the pool. Every write goes through the single writer
//! actor, which wraps each job in an immediate transaction.

pub mod bars;
pub mod db;
pub mod errors;
pub mod instruments;
pub mod schema;

pub use bars::BarRepository;
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};
pub use errors::{IntoCore, StorageError};
pub use instruments::InstrumentRepository;

// Re-export from dailybars-core for convenience
pub use dailybars_core::errors::{DatabaseError, Error, Result};
