//! Domain layer for DrySpot
//!
//! Contains the value objects, the candidate search core and domain errors.
//! This layer performs no I/O and defines the ubiquitous language.

pub mod errors;
pub mod search;
pub mod value_objects;

pub use errors::DomainError;
pub use search::*;
pub use value_objects::*;
