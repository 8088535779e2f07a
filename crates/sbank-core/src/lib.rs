#![deny(missing_docs)]
#![doc = "Core error, seeding and vocabulary types for the sbank template bank engine."]

pub mod errors;
pub mod provenance;
pub mod rng;
mod types;

pub use errors::{ErrorInfo, SbankError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::RngHandle;
pub use types::{CoordinateFrame, NeighborhoodKey};
