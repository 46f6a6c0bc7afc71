//! `OpenMeteo` forecast client
//!
//! Fetches the hourly forecast with a blocking HTTP client and normalizes
//! the per-metric arrays into timestamp-keyed series before merging them
//! into [`ForecastSample`]s.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{FetchRequest, ForecastFetcher};
use crate::config::WeatherConfig;
use crate::models::ForecastSample;
use crate::models::sample::CLEAR_SKY;
use crate::{Result, WeatherBarError};

const HOURLY_VARIABLES: &str = "precipitation,temperature_2m,wind_speed_10m,wind_direction_10m,weather_code,surface_pressure";
const FORECAST_DAYS: u8 = 2;
const USER_AGENT: &str = concat!("WeatherBar/", env!("CARGO_PKG_VERSION"));

/// Forecast response from `OpenMeteo` API
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
    pub hourly: Option<HourlyData>,
}

/// Hourly weather data from `OpenMeteo`
#[derive(Debug, Default, Deserialize)]
pub struct HourlyData {
    pub time: Vec<String>,
    pub precipitation: Option<Vec<Option<f64>>>,
    #[serde(rename = "temperature_2m")]
    pub temperature: Option<Vec<Option<f64>>>,
    #[serde(rename = "wind_speed_10m", alias = "windspeed_10m")]
    pub wind_speed: Option<Vec<Option<f64>>>,
    #[serde(rename = "wind_direction_10m", alias = "winddirection_10m")]
    pub wind_direction: Option<Vec<Option<f64>>>,
    #[serde(rename = "weather_code", alias = "weathercode")]
    pub weather_code: Option<Vec<Option<u8>>>,
    pub surface_pressure: Option<Vec<Option<f64>>>,
}

/// Body `OpenMeteo` sends along with a 4xx status
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    reason: String,
}

/// Hourly metrics keyed by timestamp. Null readings are left out, so each
/// metric may cover a different subset of `hours`.
#[derive(Debug, Default, Clone)]
pub struct HourlySeries {
    pub hours: BTreeSet<DateTime<Utc>>,
    pub precipitation: BTreeMap<DateTime<Utc>, f64>,
    pub temperature: BTreeMap<DateTime<Utc>, f64>,
    pub wind_speed: BTreeMap<DateTime<Utc>, f64>,
    pub wind_direction: BTreeMap<DateTime<Utc>, f64>,
    pub weather_code: BTreeMap<DateTime<Utc>, u8>,
    pub surface_pressure: BTreeMap<DateTime<Utc>, f64>,
}

impl HourlySeries {
    pub fn from_hourly(hourly: &HourlyData) -> Result<Self> {
        let times = hourly
            .time
            .iter()
            .map(|raw| parse_timestamp(raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            hours: times.iter().copied().collect(),
            precipitation: keyed(&times, hourly.precipitation.as_deref()),
            temperature: keyed(&times, hourly.temperature.as_deref()),
            wind_speed: keyed(&times, hourly.wind_speed.as_deref()),
            wind_direction: keyed(&times, hourly.wind_direction.as_deref()),
            weather_code: keyed(&times, hourly.weather_code.as_deref()),
            surface_pressure: keyed(&times, hourly.surface_pressure.as_deref()),
        })
    }

    /// Merge all metrics on the forecast timeline.
    ///
    /// Keeps hours strictly after `since`, at most `limit` of them. Metrics
    /// missing for an hour read as zero, the weather code as clear sky.
    #[must_use]
    pub fn merge(&self, since: DateTime<Utc>, limit: usize) -> Vec<ForecastSample> {
        self.hours
            .range((Bound::Excluded(since), Bound::Unbounded))
            .take(limit)
            .map(|timestamp| ForecastSample {
                timestamp: *timestamp,
                precipitation: value_at(&self.precipitation, timestamp, 0.0),
                temperature: value_at(&self.temperature, timestamp, 0.0),
                wind_speed: value_at(&self.wind_speed, timestamp, 0.0),
                wind_direction: value_at(&self.wind_direction, timestamp, 0.0),
                weather_code: value_at(&self.weather_code, timestamp, CLEAR_SKY),
                surface_pressure: value_at(&self.surface_pressure, timestamp, 0.0),
            })
            .collect()
    }
}

fn keyed<T: Copy>(
    times: &[DateTime<Utc>],
    values: Option<&[Option<T>]>,
) -> BTreeMap<DateTime<Utc>, T> {
    values
        .map(|values| {
            times
                .iter()
                .zip(values)
                .filter_map(|(time, value)| value.map(|value| (*time, value)))
                .collect()
        })
        .unwrap_or_default()
}

fn value_at<T: Copy>(series: &BTreeMap<DateTime<Utc>, T>, timestamp: &DateTime<Utc>, fallback: T) -> T {
    series.get(timestamp).copied().unwrap_or(fallback)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map(|dt| dt.and_utc())
        .map_err(|e| WeatherBarError::invalid_response(format!("unparseable timestamp '{raw}': {e}")))
}

/// Blocking `OpenMeteo` client
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherBarError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn forecast_url(&self, request: &FetchRequest) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&hourly={}&forecast_days={}&timezone=GMT&temperature_unit={}&wind_speed_unit={}",
            self.base_url,
            request.latitude,
            request.longitude,
            HOURLY_VARIABLES,
            FORECAST_DAYS,
            request.temperature_unit.query_value(),
            request.wind_speed_unit.query_value(),
        )
    }

    fn get_forecast(&self, request: &FetchRequest) -> Result<ForecastResponse> {
        let url = self.forecast_url(request);
        debug!("OpenMeteo API request URL: {}", url);

        let response = self.client.get(&url).send()?;
        let status = response.status();

        if !status.is_success() {
            let reason = response
                .json::<ApiErrorResponse>()
                .map(|body| body.reason)
                .unwrap_or_else(|_| {
                    format!(
                        "request failed with status: {} - {}",
                        status,
                        status.canonical_reason().unwrap_or("Unknown error")
                    )
                });
            warn!("OpenMeteo rejected forecast request ({}): {}", status, reason);
            return Err(WeatherBarError::api(reason));
        }

        response.json::<ForecastResponse>().map_err(|e| {
            WeatherBarError::invalid_response(format!(
                "Failed to parse OpenMeteo forecast response: {e}"
            ))
        })
    }
}

impl ForecastFetcher for OpenMeteoClient {
    #[instrument(name = "fetch_forecast", skip(self), fields(lat = request.latitude, lon = request.longitude))]
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<ForecastSample>> {
        request.validate()?;
        let start_time = Instant::now();

        let response = self.get_forecast(request)?;
        let hourly = response
            .hourly
            .ok_or_else(|| WeatherBarError::invalid_response("response has no hourly data"))?;

        let series = HourlySeries::from_hourly(&hourly)?;
        let since = Utc::now() - chrono::Duration::hours(1);
        let samples = series.merge(since, request.hours);

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved {} hourly samples in {:.3}s",
            samples.len(),
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow forecast API response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TemperatureUnit, WindSpeedUnit};
    use chrono::TimeZone;

    const FIXTURE: &str = r#"{
        "latitude": 51.5,
        "longitude": -0.04,
        "timezone": "GMT",
        "hourly": {
            "time": ["2024-05-01T09:00", "2024-05-01T10:00", "2024-05-01T11:00", "2024-05-01T12:00"],
            "precipitation": [0.0, 0.4, null, 1.2],
            "temperature_2m": [11.5, 12.1, 12.8, 13.0],
            "wind_speed_10m": [8.0, null, 10.2, 9.9],
            "wind_direction_10m": [200, 210, 220, 230],
            "weather_code": [1, 61, 61, null],
            "surface_pressure": [1012.0, 1011.6, 1011.1, 1010.8]
        }
    }"#;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    fn fixture_series() -> HourlySeries {
        let response: ForecastResponse = serde_json::from_str(FIXTURE).unwrap();
        HourlySeries::from_hourly(&response.hourly.unwrap()).unwrap()
    }

    #[test]
    fn test_merge_fills_missing_metrics_with_defaults() {
        let samples = fixture_series().merge(at(8), 10);

        let hours: Vec<_> = samples.iter().map(|s| s.timestamp).collect();
        assert_eq!(hours, vec![at(9), at(10), at(11), at(12)]);

        let ten = &samples[1];
        assert_eq!(ten.precipitation, 0.4);
        assert_eq!(ten.wind_speed, 0.0);
        assert_eq!(ten.wind_direction, 210.0);
        assert_eq!(ten.weather_code, 61);

        let eleven = &samples[2];
        assert_eq!(eleven.precipitation, 0.0);
        assert_eq!(eleven.temperature, 12.8);
        assert!(!eleven.has_precipitation());

        let noon = &samples[3];
        assert_eq!(noon.weather_code, CLEAR_SKY);
        assert_eq!(noon.surface_pressure, 1010.8);
    }

    #[test]
    fn test_merge_respects_limit_and_since() {
        let series = fixture_series();
        assert_eq!(series.merge(at(8), 2).len(), 2);

        let later = series.merge(at(9), 10);
        assert_eq!(later.first().unwrap().timestamp, at(10));
    }

    #[test]
    fn test_metric_with_sparse_coverage() {
        let mut series = HourlySeries::default();
        series.hours.extend([at(9), at(10), at(11)]);
        series.precipitation.insert(at(9), 0.2);
        series.wind_speed.insert(at(10), 14.0);

        let samples = series.merge(at(0), 5);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].wind_speed, 0.0);
        assert_eq!(samples[0].temperature, 0.0);
        assert_eq!(samples[1].wind_speed, 14.0);
        assert_eq!(samples[1].precipitation, 0.0);
        assert_eq!(samples[2].weather_code, CLEAR_SKY);
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        let hourly = HourlyData {
            time: vec!["yesterday".to_string()],
            ..HourlyData::default()
        };
        let err = HourlySeries::from_hourly(&hourly).unwrap_err();
        assert!(matches!(err, WeatherBarError::InvalidResponse { .. }));
    }

    #[test]
    fn test_legacy_variable_names_are_accepted() {
        let json = r#"{"time": ["2024-05-01T09:00"], "precipitation": [0.1], "windspeed_10m": [5.0], "weathercode": [3]}"#;
        let hourly: HourlyData = serde_json::from_str(json).unwrap();
        let samples = HourlySeries::from_hourly(&hourly).unwrap().merge(at(0), 5);
        assert_eq!(samples[0].wind_speed, 5.0);
        assert_eq!(samples[0].weather_code, 3);
    }

    #[test]
    fn test_forecast_url() {
        let config = WeatherConfig {
            base_url: "https://api.open-meteo.com/v1/".to_string(),
            timeout_seconds: 10,
        };
        let client = OpenMeteoClient::new(&config).unwrap();
        let request = FetchRequest {
            latitude: 51.5,
            longitude: -0.04,
            hours: 5,
            temperature_unit: TemperatureUnit::Fahrenheit,
            wind_speed_unit: WindSpeedUnit::Kn,
        };

        let url = client.forecast_url(&request);
        assert!(url.starts_with("https://api.open-meteo.com/v1/forecast?latitude=51.5&longitude=-0.04"));
        assert!(url.contains("hourly=precipitation,temperature_2m"));
        assert!(url.contains("temperature_unit=fahrenheit"));
        assert!(url.contains("wind_speed_unit=kn"));
        assert!(url.contains("timezone=GMT"));
    }

    #[test]
    fn test_invalid_coordinates_fail_before_any_request() {
        let config = WeatherConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 1,
        };
        let client = OpenMeteoClient::new(&config).unwrap();
        let request = FetchRequest {
            latitude: 97.0,
            ..FetchRequest::default()
        };
        let err = client.fetch(&request).unwrap_err();
        assert!(matches!(err, WeatherBarError::Validation { .. }));
    }
}
