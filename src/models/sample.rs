//! Hourly forecast sample model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// WMO code used when the API has no weather code for an hour
pub const CLEAR_SKY: u8 = 0;

/// One hour of forecast data
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastSample {
    /// Start of the hour this sample covers
    pub timestamp: DateTime<Utc>,
    /// Precipitation amount in mm
    pub precipitation: f64,
    /// Temperature in the requested temperature unit
    pub temperature: f64,
    /// Wind speed in the requested wind speed unit
    pub wind_speed: f64,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_direction: f64,
    /// WMO weather interpretation code
    pub weather_code: u8,
    /// Surface pressure in hPa
    pub surface_pressure: f64,
}

impl ForecastSample {
    #[must_use]
    pub fn has_precipitation(&self) -> bool {
        self.precipitation > 0.0
    }

    /// Human-readable condition for this hour
    #[must_use]
    pub fn description(&self) -> &'static str {
        weather_code_to_description(self.weather_code)
    }
}

/// Convert a WMO weather code to a human-readable description
#[must_use]
pub fn weather_code_to_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_weather_code_description() {
        assert_eq!(weather_code_to_description(CLEAR_SKY), "Clear sky");
        assert_eq!(weather_code_to_description(63), "Moderate rain");
        assert_eq!(weather_code_to_description(42), "Unknown");
    }

    #[test]
    fn test_has_precipitation() {
        let mut sample = ForecastSample {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            precipitation: 0.0,
            temperature: 14.2,
            wind_speed: 11.0,
            wind_direction: 225.0,
            weather_code: 3,
            surface_pressure: 1008.4,
        };
        assert!(!sample.has_precipitation());
        assert_eq!(sample.description(), "Overcast");

        sample.precipitation = 0.3;
        assert!(sample.has_precipitation());
    }
}
