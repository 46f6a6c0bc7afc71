//! Data models for the WeatherBar application
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and the named-place reference table
//! - Sample: One hour of forecast data and its display helpers
//! - Forecast: The cached forecast outcome
//! - Units: Measurement units requested from the API and shown to the user

pub mod forecast;
pub mod location;
pub mod sample;
pub mod units;

// Re-export all public types for convenient access
pub use forecast::ForecastResult;
pub use location::{Location, NamedPlace};
pub use sample::ForecastSample;
pub use units::{PressureUnit, TemperatureUnit, WindSpeedUnit};
