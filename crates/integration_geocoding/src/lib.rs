//! Geocoding integration for DrySpot
//!
//! Resolves place names to coordinates and coordinates back to readable
//! labels via [Nominatim/OpenStreetMap](https://nominatim.openstreetmap.org).
//!
//! [`GeocodingClient`] defines the interface, implemented by
//! [`NominatimGeocodingClient`]. The client honours the Nominatim usage
//! policy (at most one request per second) and caches forward lookups.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_geocoding::{GeocodingClient, NominatimConfig, NominatimGeocodingClient};
//!
//! let client = NominatimGeocodingClient::new(&NominatimConfig::default())?;
//! let berlin = client.geocode("Berlin").await?;
//! ```

mod client;
mod config;
mod error;
mod models;

pub use client::{GeocodingClient, NominatimGeocodingClient};
pub use config::NominatimConfig;
pub use error::GeocodingError;
