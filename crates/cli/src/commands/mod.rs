//! Subcommand implementations.

pub mod contact;
pub mod weather;

use clap::Args;

/// Arguments for the weather command.
#[derive(Args)]
pub struct WeatherArgs {
    /// City to look up (defaults to weather.default_city)
    pub city: Option<String>,

    /// Keep running and print every state change until Ctrl-C
    #[arg(short, long)]
    pub watch: bool,

    /// Poll interval in milliseconds while watching
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Simulate a window focus event every N seconds while watching
    #[arg(long)]
    pub focus_every: Option<u64>,
}

/// Arguments for the contact command.
#[derive(Args)]
pub struct ContactArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub subject: String,

    #[arg(long)]
    pub message: String,
}
