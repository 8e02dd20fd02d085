mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use calpage_core::calendar::Calendar;
use calpage_core::settings::{FileRemote, NoRemote, RemoteSettings, Settings};
use calpage_core::source::{FetchWindow, JsonFeed};
use chrono::Duration;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calpage")]
#[command(about = "Build the enriched event data behind the events page")]
struct Cli {
    /// JSON file holding the raw calendar event feed
    #[arg(long, global = true, default_value = "events.json")]
    feed: PathBuf,

    /// Settings file overriding defaults, remote config, and env
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Local file standing in for the remote settings document
    #[arg(long, global = true)]
    remote_config: Option<PathBuf>,

    /// Fetch window length in days, starting now
    #[arg(long, global = true, default_value_t = 365)]
    days: i64,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the enriched events grouped by day
    Events {
        /// Only show events in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show the category filter sets the page offers
    Filters,
    /// Plan cover image downloads against a local image directory
    Images {
        /// Directory holding already-downloaded cover images
        #[arg(long, default_value = "static/images")]
        dir: PathBuf,
    },
    /// Show the effective settings
    Config,
    /// Export the full render context as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Directory holding already-downloaded cover images
        #[arg(long, default_value = "static/images")]
        images_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let settings = load_settings(&cli)?;
    let feed = JsonFeed::new(&cli.feed);

    match cli.command {
        Commands::Events { category } => {
            let mut calendar = build_calendar(&settings, cli.days)?;
            commands::events::run(&mut calendar, &feed, category.as_deref())
        }
        Commands::Filters => {
            let mut calendar = build_calendar(&settings, cli.days)?;
            commands::filters::run(&mut calendar, &feed)
        }
        Commands::Images { dir } => {
            let mut calendar = build_calendar(&settings, cli.days)?;
            commands::images::run(&mut calendar, &feed, &dir)
        }
        Commands::Config => commands::config::run(&settings),
        Commands::Export { out, images_dir } => {
            let mut calendar = build_calendar(&settings, cli.days)?;
            commands::export::run(&mut calendar, &feed, &settings, &images_dir, out.as_deref())
        }
    }
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let remote: Box<dyn RemoteSettings> = match &cli.remote_config {
        Some(path) => Box::new(FileRemote::new(path)),
        None => Box::new(NoRemote),
    };

    Ok(Settings::load(remote.as_ref(), cli.settings.as_deref())?)
}

fn build_calendar(settings: &Settings, days: i64) -> Result<Calendar> {
    let window = FetchWindow::starting_now(Duration::days(days));
    Ok(Calendar::new(settings, window)?)
}
