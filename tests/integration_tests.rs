//! Integration tests for the weatherbar CLI

use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

fn weatherbar(config_dir: &TempDir, args: &[&str]) -> Output {
    let config_path = config_dir.path().join("config.toml");
    Command::new(env!("CARGO_BIN_EXE_weatherbar"))
        .arg("--config")
        .arg(&config_path)
        .args(args)
        .env_remove("RUST_LOG")
        // Nothing listens on the discard port, so fetches fail fast
        .env("WEATHERBAR_WEATHER__BASE_URL", "http://127.0.0.1:9")
        .env("WEATHERBAR_WEATHER__TIMEOUT_SECONDS", "2")
        .output()
        .expect("Failed to execute weatherbar")
}

fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_weatherbar"))
        .arg("--help")
        .output()
        .expect("Failed to execute weatherbar");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Hourly weather forecast for your status bar"));
    assert!(stdout.contains("--once"));
    assert!(stdout.contains("--hours"));
}

#[test]
fn test_hours_out_of_range_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = weatherbar(&dir, &["--once", "--hours", "42"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Forecast hours must be between 2 and 10"),
        "unexpected output: {stderr}"
    );
}

#[test]
fn test_invalid_coordinates_are_rejected() {
    let dir = TempDir::new().unwrap();
    let output = weatherbar(&dir, &["--once", "--latitude", "-95.0"]);

    assert!(!output.status.success());
    assert!(combined(&output).contains("Configuration error"));
}

#[test]
fn test_once_with_unreachable_api_reports_error() {
    let dir = TempDir::new().unwrap();
    let output = weatherbar(&dir, &["--once"]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("[No data] London"), "unexpected output: {stdout}");
    assert!(stdout.contains("Network error"), "unexpected output: {stdout}");
}

#[test]
fn test_verbose_output_shows_config_details() {
    let dir = TempDir::new().unwrap();
    let output = weatherbar(&dir, &["--verbose", "--once"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let expected_path = dir.path().join("config.toml");
    assert!(stdout.contains(&format!("Using config from: {}", expected_path.display())));
    assert!(stdout.contains("Location: London (51.4914, -0.0357)"));
    assert!(stdout.contains("Hours: 5"));
    assert!(stdout.contains("Log level: info"));
}

#[test]
fn test_config_file_location_is_used() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[location]\nlatitude = 48.87\nlongitude = 2.33\n\n[forecast]\nhours = 3\n",
    )
    .unwrap();

    let output = weatherbar(&dir, &["--verbose", "--once"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Location: Paris (48.8700, 2.3300)"), "unexpected output: {stdout}");
    assert!(stdout.contains("Hours: 3"));
    assert!(stdout.contains("[No data] Paris"));
}

#[test]
fn test_coordinate_flags_override_city_name() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[location]\ncity_name = \"Home\"\n",
    )
    .unwrap();

    let output = weatherbar(
        &dir,
        &["--verbose", "--once", "--latitude", "52.52", "--longitude", "13.40"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Location: Berlin"), "unexpected output: {stdout}");
    assert!(!stdout.contains("Home"));
}
