//! Cached forecast outcome

use std::sync::Arc;

use super::ForecastSample;
use crate::WeatherBarError;

/// Outcome of the most recent forecast fetch
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ForecastResult {
    /// Non-empty, ascending samples, at most the configured hour limit
    Present(Arc<[ForecastSample]>),
    /// Diagnostic text for display only
    Error(String),
    /// Nothing has been fetched yet
    #[default]
    NotPresent,
}

impl ForecastResult {
    /// Build a result from a fetch outcome, enforcing the sample invariants.
    ///
    /// Samples are sorted by timestamp and truncated to `hours`. An empty
    /// sample list is reported as an error, since `Present` is never empty.
    #[must_use]
    pub fn from_fetch(
        outcome: std::result::Result<Vec<ForecastSample>, WeatherBarError>,
        hours: usize,
    ) -> Self {
        match outcome {
            Ok(mut samples) => {
                samples.sort_by_key(|sample| sample.timestamp);
                samples.truncate(hours);
                if samples.is_empty() {
                    Self::Error(
                        WeatherBarError::invalid_response("forecast contained no hourly samples")
                            .to_string(),
                    )
                } else {
                    Self::Present(samples.into())
                }
            }
            Err(err) => Self::Error(err.to_string()),
        }
    }

    #[must_use]
    pub fn samples(&self) -> Option<&[ForecastSample]> {
        match self {
            Self::Present(samples) => Some(samples),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn samples(count: usize) -> Vec<ForecastSample> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        (0..count)
            .rev()
            .map(|i| ForecastSample {
                timestamp: start + Duration::hours(i as i64),
                precipitation: 0.1 * i as f64,
                temperature: 12.0,
                wind_speed: 9.0,
                wind_direction: 180.0,
                weather_code: 61,
                surface_pressure: 1011.0,
            })
            .collect()
    }

    #[test]
    fn test_from_fetch_sorts_and_truncates() {
        let result = ForecastResult::from_fetch(Ok(samples(8)), 5);
        let present = result.samples().unwrap();
        assert_eq!(present.len(), 5);
        assert!(present.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(present[0].precipitation, 0.0);
    }

    #[test]
    fn test_from_fetch_empty_is_error() {
        let result = ForecastResult::from_fetch(Ok(Vec::new()), 5);
        assert!(result.is_error());
    }

    #[test]
    fn test_from_fetch_error_keeps_category() {
        let result =
            ForecastResult::from_fetch(Err(WeatherBarError::validation("latitude 95 out of range")), 5);
        assert_eq!(
            result,
            ForecastResult::Error("Invalid input: latitude 95 out of range".to_string())
        );
    }

    #[test]
    fn test_default_is_not_present() {
        assert_eq!(ForecastResult::default(), ForecastResult::NotPresent);
    }
}
