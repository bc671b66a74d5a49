//! Application layer - Use cases and orchestration
//!
//! Contains the search use case, its supersession guard and the port
//! definitions. Orchestrates domain objects and infrastructure adapters.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
