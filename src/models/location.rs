//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};

use crate::WeatherBarError;

/// Location coordinates
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Location name (city, region, etc.)
    pub name: String,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String) -> Self {
        Self {
            latitude,
            longitude,
            name,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Entry of the built-in reference table used for nearest-place lookups
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedPlace {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl NamedPlace {
    #[must_use]
    pub const fn new(name: &'static str, latitude: f64, longitude: f64) -> Self {
        Self {
            name,
            latitude,
            longitude,
        }
    }
}

/// Check that a coordinate pair lies within WGS84 ranges
pub fn validate_coordinates(latitude: f64, longitude: f64) -> crate::Result<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(WeatherBarError::validation(format!(
            "latitude {latitude} must be between -90 and 90"
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(WeatherBarError::validation(format!(
            "longitude {longitude} must be between -180 and 180"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_format_coordinates() {
        let location = Location::new(51.491_41, -0.035_749, "London".to_string());
        assert_eq!(location.format_coordinates(), "51.4914, -0.0357");
    }

    #[rstest]
    #[case(51.49, -0.036, true)]
    #[case(90.0, 180.0, true)]
    #[case(-90.0, -180.0, true)]
    #[case(90.5, 0.0, false)]
    #[case(0.0, -180.5, false)]
    #[case(f64::NAN, 0.0, false)]
    fn test_validate_coordinates(#[case] lat: f64, #[case] lon: f64, #[case] valid: bool) {
        assert_eq!(validate_coordinates(lat, lon).is_ok(), valid);
    }
}
