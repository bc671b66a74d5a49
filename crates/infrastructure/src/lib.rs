//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports on top of the Open-Meteo and Nominatim
//! clients, and holds configuration loading, logging setup and retry.

pub mod adapters;
pub mod config;
pub mod retry;
pub mod telemetry;

pub use adapters::*;
pub use config::{
    AppConfig, ForecastAppConfig, GeocodingAppConfig, HttpAppConfig, SearchAppConfig,
};
pub use retry::{RetryConfig, Retryable, retry};
pub use telemetry::{LoggingConfig, TelemetryError, init_logging};
