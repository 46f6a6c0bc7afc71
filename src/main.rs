//! `weatherbar`: prints the hourly forecast the way a status bar widget shows it.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use weatherbar::config::LoggingConfig;
use weatherbar::display::{self, DisplayOptions};
use weatherbar::{
    FetchRequest, ForecastCache, ForecastResult, OpenMeteoClient, RefreshPolicy, WeatherBarConfig,
};

/// Hourly weather forecast for your status bar
#[derive(Parser, Debug)]
#[command(name = "weatherbar", version, about = "Hourly weather forecast for your status bar")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log debug output and print the effective configuration
    #[arg(short, long)]
    verbose: bool,

    /// Fetch once, print the forecast and exit
    #[arg(long)]
    once: bool,

    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    latitude: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    longitude: Option<f64>,

    /// Number of hourly samples to show (2-10)
    #[arg(long)]
    hours: Option<usize>,
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,weatherbar={level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let initialised = if logging.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    initialised.map_err(|e| anyhow!("Failed to initialise logging: {e}"))
}

fn load_config(cli: &Cli) -> Result<WeatherBarConfig> {
    let mut config = WeatherBarConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;

    if cli.latitude.is_some() || cli.longitude.is_some() {
        config.location.city_name = None;
    }
    if let Some(latitude) = cli.latitude {
        config.location.latitude = latitude;
    }
    if let Some(longitude) = cli.longitude {
        config.location.longitude = longitude;
    }
    if let Some(hours) = cli.hours {
        config.forecast.hours = hours;
    }

    config.validate()?;
    Ok(config)
}

fn print_forecast(result: &ForecastResult, options: &DisplayOptions) {
    println!(
        "[{}] {}",
        display::status_text(result, options),
        display::headline(result, options)
    );
    println!("{}", display::tooltip(result, options).trim_end());
}

async fn run(cache: ForecastCache, options: DisplayOptions) -> Result<()> {
    let mut updates = cache.subscribe();
    let _consumer = cache.attach_consumer();
    let poller = cache.spawn_poller();

    print_forecast(&cache.get_cached(), &options);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let result = updates.borrow_and_update().clone();
                debug!("Forecast update received");
                print_forecast(&result, &options);
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }

    poller.abort();
    Ok(())
}

async fn serve(
    cli: &Cli,
    config: &WeatherBarConfig,
    fetcher: Arc<OpenMeteoClient>,
) -> Result<ExitCode> {
    let cache = ForecastCache::new(
        fetcher,
        FetchRequest::from_config(config),
        RefreshPolicy::from(&config.cache),
    )?;
    let options = DisplayOptions::from_config(config);

    if cli.once {
        let result = cache.refresh().await;
        print_forecast(&result, &options);
        return Ok(if result.is_error() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    run(cache, options).await?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.logging, cli.verbose)?;

    if cli.verbose {
        let config_path = cli
            .config
            .clone()
            .or_else(WeatherBarConfig::get_config_path)
            .map_or_else(|| "defaults".to_string(), |p| p.display().to_string());
        println!("Using config from: {config_path}");
        let location = config.location();
        println!(
            "Location: {} ({})",
            location.name,
            location.format_coordinates()
        );
        println!("Hours: {}", config.forecast.hours);
        println!("Log level: {}", config.logging.level);
    }

    // The blocking HTTP client must be created outside of the async runtime
    let fetcher = Arc::new(OpenMeteoClient::new(&config.weather)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;
    runtime.block_on(serve(&cli, &config, fetcher))
}
