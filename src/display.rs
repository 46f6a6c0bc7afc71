//! Text rendering of the cached forecast: the short status text, the
//! headline and the hourly tooltip table.

use std::fmt::Write;

use chrono::Local;

use crate::config::WeatherBarConfig;
use crate::models::{ForecastResult, ForecastSample, PressureUnit, TemperatureUnit, WindSpeedUnit};

/// Precipitation (mm) that fills a whole bar
pub const MAX_PRECIPITATION_MM: f64 = 15.0;
/// Smallest visible bar for any rain at all
pub const MIN_BAR_LEVEL: u32 = 3;

const SPARK_LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Display preferences taken from the configuration
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub city: String,
    pub show_wind: bool,
    pub show_temperature: bool,
    pub temperature_unit: TemperatureUnit,
    pub wind_speed_unit: WindSpeedUnit,
    pub pressure_unit: PressureUnit,
}

impl DisplayOptions {
    #[must_use]
    pub fn from_config(config: &WeatherBarConfig) -> Self {
        Self {
            city: config.city_name(),
            show_wind: config.forecast.show_wind,
            show_temperature: config.forecast.show_temperature,
            temperature_unit: config.forecast.temperature_unit,
            wind_speed_unit: config.forecast.wind_speed_unit,
            pressure_unit: config.forecast.pressure_unit,
        }
    }
}

/// Arrow pointing where the wind blows to
#[must_use]
pub fn wind_direction_arrow(degrees: f64) -> &'static str {
    match degrees {
        d if d > 337.5 => "↓",
        d if d > 292.5 => "↘",
        d if d > 247.5 => "→",
        d if d > 202.5 => "↗",
        d if d > 157.5 => "↑",
        d if d > 122.5 => "↖",
        d if d > 67.5 => "←",
        d if d > 22.5 => "↙",
        _ => "↓",
    }
}

/// Rounded value with an explicit plus sign above zero
#[must_use]
pub fn signed_rounded(value: f64) -> String {
    let rounded = value.round() as i64;
    if rounded > 0 {
        format!("+{rounded}")
    } else {
        rounded.to_string()
    }
}

/// Bar height for a precipitation amount, for a chart `max_level` high
#[must_use]
pub fn precipitation_level(precipitation: f64, max_level: u32) -> u32 {
    if precipitation <= 0.0 {
        return 0;
    }
    if precipitation >= MAX_PRECIPITATION_MM {
        return max_level;
    }
    let level = (precipitation / MAX_PRECIPITATION_MM * f64::from(max_level)) as u32;
    level.max(MIN_BAR_LEVEL).min(max_level)
}

/// One block character per sample, scaled like the status bar chart
#[must_use]
pub fn precipitation_sparkline(samples: &[ForecastSample]) -> String {
    let max_level = (SPARK_LEVELS.len() - 1) as u32;
    samples
        .iter()
        .map(|sample| SPARK_LEVELS[precipitation_level(sample.precipitation, max_level) as usize])
        .collect()
}

/// Short text shown in the status bar
#[must_use]
pub fn status_text(result: &ForecastResult, options: &DisplayOptions) -> String {
    let Some(first) = result.samples().and_then(<[ForecastSample]>::first) else {
        return "No data".to_string();
    };

    let mut parts = Vec::new();
    if options.show_wind {
        parts.push(format!(
            "{}{}",
            wind_direction_arrow(first.wind_direction),
            first.wind_speed.round() as i64
        ));
    }
    if options.show_temperature {
        parts.push(signed_rounded(first.temperature));
    }
    parts.join(" ")
}

/// "Overcast in London" style title
#[must_use]
pub fn headline(result: &ForecastResult, options: &DisplayOptions) -> String {
    match result.samples().and_then(<[ForecastSample]>::first) {
        Some(first) => format!("{} in {}", first.description(), options.city),
        None => options.city.clone(),
    }
}

/// Multi-line hourly table
#[must_use]
pub fn tooltip(result: &ForecastResult, options: &DisplayOptions) -> String {
    let samples = match result {
        ForecastResult::Error(message) => return message.clone(),
        ForecastResult::NotPresent => return "no data".to_string(),
        ForecastResult::Present(samples) => samples,
    };

    let precipitation_expected = samples.iter().any(ForecastSample::has_precipitation);
    let mut out = String::new();

    let _ = write!(out, "{:<5} {:>7}", "Time", "Temp");
    if precipitation_expected {
        let _ = write!(out, "  {:<28}", "Precipitation");
    }
    let _ = writeln!(out, " {:>10} {:>9}", "Pressure", "Wind");

    for sample in samples.iter() {
        let hour = sample.timestamp.with_timezone(&Local).format("%Hh");
        let temperature = format!(
            "{} {}",
            signed_rounded(sample.temperature),
            options.temperature_unit.symbol()
        );
        let _ = write!(out, "{hour:<5} {temperature:>7}");

        if precipitation_expected {
            let mut cell = String::new();
            if sample.weather_code > 3 {
                cell.push_str(sample.description());
                cell.push(' ');
            }
            if sample.has_precipitation() {
                let _ = write!(cell, "{} mm", sample.precipitation);
            }
            let _ = write!(out, "  {:<28}", cell.trim_end());
        }

        let pressure = format!(
            "{} {}",
            options.pressure_unit.from_hpa(sample.surface_pressure).round() as i64,
            options.pressure_unit.symbol()
        );
        let wind = format!(
            "{} {}",
            sample.wind_speed.round() as i64,
            options.wind_speed_unit.symbol()
        );
        let _ = writeln!(
            out,
            " {pressure:>10} {wind:>9} {}",
            wind_direction_arrow(sample.wind_direction)
        );
    }

    if precipitation_expected {
        let _ = writeln!(out, "Rain  {}", precipitation_sparkline(samples));
    } else {
        let _ = writeln!(out, "No precipitation expected");
    }

    out
}
