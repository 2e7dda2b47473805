//! Domain layer for meteobridge
//!
//! Contains the normalized records every upstream source is reduced to,
//! the value objects used to address locations, and domain errors.
//! This layer performs no I/O and defines the shared vocabulary.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
