//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - The Alpha Vantage implementation
//!
//! Providers receive pre-resolved tickers. Mapping user symbols to
//! provider tickers happens in the resolver module, not in the providers
//! themselves.

mod traits;

pub mod alpha_vantage;

pub use traits::MarketDataProvider;
