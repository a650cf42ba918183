//! Instrument metadata: models and storage trait.

mod model;
mod store;

pub use model::{Instrument, NewInstrument};
pub use store::InstrumentRepositoryTrait;
