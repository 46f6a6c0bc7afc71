//! Measurement units for temperature, wind speed and pressure

use serde::{Deserialize, Serialize};

/// hPa to mmHg conversion factor
pub const HPA_TO_MMHG: f64 = 0.750_063_755_419_21;

/// Temperature unit requested from the forecast API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Value of the `temperature_unit` query parameter
    #[must_use]
    pub fn query_value(self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

/// Wind speed unit requested from the forecast API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindSpeedUnit {
    /// Kilometres per hour
    #[default]
    Kmh,
    /// Metres per second
    Ms,
    /// Miles per hour
    Mph,
    /// Knots
    Kn,
}

impl WindSpeedUnit {
    /// Value of the `wind_speed_unit` query parameter
    #[must_use]
    pub fn query_value(self) -> &'static str {
        match self {
            Self::Kmh => "kmh",
            Self::Ms => "ms",
            Self::Mph => "mph",
            Self::Kn => "kn",
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Kmh => "km/h",
            Self::Ms => "m/s",
            Self::Mph => "mph",
            Self::Kn => "kn",
        }
    }
}

/// Pressure unit used for display. The API always reports hPa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureUnit {
    #[default]
    Mmhg,
    Hpa,
}

impl PressureUnit {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Mmhg => "mmHg",
            Self::Hpa => "hPa",
        }
    }

    /// Multiplier applied to a value in hPa
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Mmhg => HPA_TO_MMHG,
            Self::Hpa => 1.0,
        }
    }

    /// Convert a surface pressure reading in hPa to this unit
    #[must_use]
    pub fn from_hpa(self, hpa: f64) -> f64 {
        hpa * self.multiplier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(WindSpeedUnit::Kmh, "kmh", "km/h")]
    #[case(WindSpeedUnit::Ms, "ms", "m/s")]
    #[case(WindSpeedUnit::Mph, "mph", "mph")]
    #[case(WindSpeedUnit::Kn, "kn", "kn")]
    fn test_wind_speed_unit_strings(
        #[case] unit: WindSpeedUnit,
        #[case] query: &str,
        #[case] symbol: &str,
    ) {
        assert_eq!(unit.query_value(), query);
        assert_eq!(unit.symbol(), symbol);
    }

    #[test]
    fn test_pressure_conversion() {
        let mmhg = PressureUnit::Mmhg.from_hpa(1013.25);
        assert!((mmhg - 760.0).abs() < 0.01);
        assert_eq!(PressureUnit::Hpa.from_hpa(1013.25), 1013.25);
    }

    #[test]
    fn test_units_deserialize_from_config_strings() {
        let unit: TemperatureUnit = serde_json::from_str("\"fahrenheit\"").unwrap();
        assert_eq!(unit, TemperatureUnit::Fahrenheit);
        let unit: WindSpeedUnit = serde_json::from_str("\"kn\"").unwrap();
        assert_eq!(unit, WindSpeedUnit::Kn);
        let unit: PressureUnit = serde_json::from_str("\"hpa\"").unwrap();
        assert_eq!(unit, PressureUnit::Hpa);
    }
}
