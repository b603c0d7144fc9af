//! In-memory flight schedule used by the support agent's lookup tools.

mod record;
mod sample;
mod store;

pub use record::FlightRecord;
pub use sample::sample_flights;
pub use store::{FlightStore, FlightStoreError};
