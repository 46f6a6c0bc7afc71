//! `WeatherBar` - hourly weather forecast for a status bar
//!
//! This library provides a self-refreshing forecast cache, the `OpenMeteo`
//! fetcher that feeds it, nearest-place naming for coordinates and the text
//! rendering used by the `weatherbar` binary.

pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod location_resolver;
pub mod models;
pub mod weather;

// Re-export core types for public API
pub use cache::{CacheState, ConsumerGuard, ForecastCache, RefreshPolicy};
pub use config::WeatherBarConfig;
pub use error::WeatherBarError;
pub use location_resolver::LocationResolver;
pub use models::{ForecastResult, ForecastSample, Location};
pub use weather::{FetchRequest, ForecastFetcher, OpenMeteoClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherBarError>;
