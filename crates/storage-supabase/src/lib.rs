//! Supabase storage implementation for dailybars.
//!
//! Talks to the project's PostgREST endpoint (`/rest/v1`) with the service
//! role key. Table layout is in `deploy/supabase/schema.sql`.
//!
//! Upserts rely on the `(instrument_id, date)` primary key of `ohlcv_data`
//! and the unique `symbol` column of `instruments`.

pub mod bars;
pub mod client;
pub mod instruments;

pub use bars::SupabaseBarRepository;
pub use client::PostgrestClient;
pub use instruments::SupabaseInstrumentRepository;
