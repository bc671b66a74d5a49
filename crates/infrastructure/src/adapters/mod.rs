//! Infrastructure adapters
//!
//! Adapters connect application ports to the HTTP integration clients.

mod forecast_adapter;
mod geocoding_adapter;

pub use forecast_adapter::ForecastAdapter;
pub use geocoding_adapter::GeocodingAdapter;
