//! folio command line entry point.
//!
//! Drives the weather widget and contact form from a terminal. Logs go to
//! stderr so stdout only carries the rendered output.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_client::{HttpFetcher, MockWeatherFetcher, ResourceManager};
use folio_core::{AppConfig, config::WeatherSource};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{ContactArgs, WeatherArgs};
use output::Output;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Emit JSON logs and JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Config file path (overrides FOLIO_CONFIG_FILE)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current weather for a city
    Weather(WeatherArgs),

    /// Send a message through the contact form
    Contact(ContactArgs),
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from(Some(path)),
        None => AppConfig::load(),
    }
    .context("failed to load configuration")?;

    let output = Output::new(cli.json);

    let result = match cli.command {
        Commands::Weather(args) => {
            let manager = build_manager(&config)?;
            commands::weather::run(args, &config, &manager, &output).await
        }
        Commands::Contact(args) => commands::contact::run(args, &config, &output).await,
    };

    if let Err(e) = result {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

fn build_manager(config: &AppConfig) -> Result<ResourceManager> {
    let fetcher: Arc<dyn folio_client::Fetcher> = match config.weather.source {
        WeatherSource::Mock => {
            tracing::info!("using mock weather source");
            Arc::new(MockWeatherFetcher::default())
        }
        WeatherSource::Api => {
            tracing::info!(api_base = %config.weather.api_base, "using weather API");
            Arc::new(HttpFetcher::new(config.into()).context("failed to build HTTP client")?)
        }
    };
    Ok(ResourceManager::with_global_cache(fetcher))
}
