//! Wiring for the `dailybars-ingest` binary: logging, store selection and
//! the ingestion service.

mod main_lib;

pub use main_lib::{build_service, build_stores, init_tracing, run, Stores};
