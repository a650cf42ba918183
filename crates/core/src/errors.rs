//! Core error types for dailybars.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, PostgREST, etc.) are converted to these types by the
//! storage layer.

use thiserror::Error;

use dailybars_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type.
///
/// Database-specific errors are wrapped in string form to keep this type
/// database-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Errors that will repeat for every remaining symbol of a run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Database(DatabaseError::Unauthorized(_)) | Error::Config(_)
        )
    }

    /// Failures a later run can get past without a configuration change.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::MarketData(e) => e.is_transient(),
            Error::Database(DatabaseError::ConnectionFailed(_)) => true,
            _ => false,
        }
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The store rejected our credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Errors raised while loading configuration. All of them abort the run
/// before any symbol is processed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration key: {0}")]
    MissingKey(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("No symbols configured. Set SYMBOLS='AAPL,TSLA' or SYMBOL='AAPL'")]
    NoSymbols,
}
