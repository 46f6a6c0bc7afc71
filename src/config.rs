//! Configuration management for `WeatherBar`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherBarError;
use crate::location_resolver::LocationResolver;
use crate::models::Location;
use crate::models::location::validate_coordinates;
use crate::models::{PressureUnit, TemperatureUnit, WindSpeedUnit};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Smallest number of hourly samples a forecast may be limited to
pub const MIN_HOURS: usize = 2;
/// Largest number of hourly samples a forecast may be limited to
pub const MAX_HOURS: usize = 10;

/// Root configuration structure for `WeatherBar`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherBarConfig {
    /// Where to fetch the forecast for
    #[serde(default)]
    pub location: LocationConfig,
    /// What to fetch and how to show it
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Refresh policy of the in-memory cache
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Forecast coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Latitude in decimal degrees
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    /// Longitude in decimal degrees
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// Display name; derived from the nearest known place when unset
    pub city_name: Option<String>,
}

/// Forecast contents and display preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of hourly samples to keep
    #[serde(default = "default_hours")]
    pub hours: usize,
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
    #[serde(default)]
    pub wind_speed_unit: WindSpeedUnit,
    #[serde(default)]
    pub pressure_unit: PressureUnit,
    /// Show wind direction and speed in the status text
    #[serde(default = "default_true")]
    pub show_wind: bool,
    /// Show temperature in the status text
    #[serde(default = "default_true")]
    pub show_temperature: bool,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

/// Cache refresh policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Minimum time between two fetch attempts
    #[serde(default = "default_debounce")]
    pub debounce_seconds: u64,
    /// Age after which a successful forecast is refetched
    #[serde(default = "default_stale_after")]
    pub stale_after_seconds: u64,
    /// Interval of the background refresh loop
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_latitude() -> f64 {
    51.491_41
}

fn default_longitude() -> f64 {
    -0.035_749
}

fn default_hours() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_debounce() -> u64 {
    30
}

fn default_stale_after() -> u64 {
    5 * 60
}

fn default_poll_interval() -> u64 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            city_name: None,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            hours: default_hours(),
            temperature_unit: TemperatureUnit::default(),
            wind_speed_unit: WindSpeedUnit::default(),
            pressure_unit: PressureUnit::default(),
            show_wind: true,
            show_temperature: true,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            debounce_seconds: default_debounce(),
            stale_after_seconds: default_stale_after(),
            poll_interval_seconds: default_poll_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_secs(self.debounce_seconds)
    }

    #[must_use]
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_seconds)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

impl WeatherBarConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides such as WEATHERBAR_FORECAST__HOURS=8
        builder = builder.add_source(
            Environment::with_prefix("WEATHERBAR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherBarConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherbar").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.forecast.hours == 0 {
            self.forecast.hours = default_hours();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.cache.debounce_seconds == 0 {
            self.cache.debounce_seconds = default_debounce();
        }
        if self.cache.stale_after_seconds == 0 {
            self.cache.stale_after_seconds = default_stale_after();
        }
        if self.cache.poll_interval_seconds == 0 {
            self.cache.poll_interval_seconds = default_poll_interval();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self
            .location
            .city_name
            .as_ref()
            .is_some_and(|name| name.trim().is_empty())
        {
            self.location.city_name = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_location()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_location(&self) -> Result<()> {
        validate_coordinates(self.location.latitude, self.location.longitude)
            .map_err(|err| WeatherBarError::config(err.to_string()))?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(MIN_HOURS..=MAX_HOURS).contains(&self.forecast.hours) {
            return Err(WeatherBarError::config(format!(
                "Forecast hours must be between {MIN_HOURS} and {MAX_HOURS}, got {}",
                self.forecast.hours
            ))
            .into());
        }

        if self.weather.timeout_seconds > 300 {
            return Err(
                WeatherBarError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.cache.debounce_seconds > self.cache.stale_after_seconds {
            return Err(WeatherBarError::config(
                "Cache debounce cannot be longer than the staleness threshold",
            )
            .into());
        }

        if self.cache.poll_interval_seconds > 3600 {
            return Err(
                WeatherBarError::config("Poll interval cannot exceed 3600 seconds").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherBarError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherBarError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(WeatherBarError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }

    /// Display name of the configured location
    #[must_use]
    pub fn city_name(&self) -> String {
        self.location.city_name.clone().unwrap_or_else(|| {
            LocationResolver::resolve_coordinates(self.location.latitude, self.location.longitude)
                .name
        })
    }

    /// Configured coordinates together with their display name
    #[must_use]
    pub fn location(&self) -> Location {
        Location::new(
            self.location.latitude,
            self.location.longitude,
            self.city_name(),
        )
    }
}
