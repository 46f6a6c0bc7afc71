use serde::{Deserialize, Serialize};

use crate::config::{MAX_HOURS, MIN_HOURS, WeatherBarConfig};
use crate::models::location::validate_coordinates;
use crate::models::{ForecastSample, TemperatureUnit, WindSpeedUnit};
use crate::{Result, WeatherBarError};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Everything a fetcher needs to produce a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Maximum number of hourly samples to return
    pub hours: usize,
    pub temperature_unit: TemperatureUnit,
    pub wind_speed_unit: WindSpeedUnit,
}

impl FetchRequest {
    #[must_use]
    pub fn from_config(config: &WeatherBarConfig) -> Self {
        Self {
            latitude: config.location.latitude,
            longitude: config.location.longitude,
            hours: config.forecast.hours,
            temperature_unit: config.forecast.temperature_unit,
            wind_speed_unit: config.forecast.wind_speed_unit,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_coordinates(self.latitude, self.longitude)?;
        if !(MIN_HOURS..=MAX_HOURS).contains(&self.hours) {
            return Err(WeatherBarError::validation(format!(
                "hours {} must be between {MIN_HOURS} and {MAX_HOURS}",
                self.hours
            )));
        }
        Ok(())
    }
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self::from_config(&WeatherBarConfig::default())
    }
}

/// Source of hourly forecast samples.
///
/// `fetch` performs blocking I/O and is only ever called from a blocking
/// worker. Implementations return samples in ascending order, at most
/// `request.hours` of them, and never retry on their own.
pub trait ForecastFetcher: Send + Sync {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<ForecastSample>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_default_config() {
        let request = FetchRequest::default();
        assert_eq!(request.hours, 5);
        assert_eq!(request.latitude, 51.491_41);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_validation() {
        let mut request = FetchRequest::default();
        request.longitude = 200.0;
        assert!(matches!(
            request.validate(),
            Err(WeatherBarError::Validation { .. })
        ));

        let mut request = FetchRequest::default();
        request.hours = 12;
        assert!(request.validate().is_err());
    }
}
