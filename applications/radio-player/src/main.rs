/// Krushi Radio Player - live stream player for the terminal
use clap::{Parser, Subcommand};
use radio_connectivity::{ConnectivityMonitor, TcpProbe};
use radio_playback::station::{station_info, LINKS};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod display;
mod error;
mod listen;

use config::PlayerConfig;
use display::{render_connectivity, render_links, render_station};

#[derive(Parser)]
#[command(name = "radio-player")]
#[command(about = "Krushi Radio live stream player", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./radio.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the live stream (default)
    Listen,
    /// Show station information
    Info {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// List the station's external links
    Links {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Probe the stream host once
    Status {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = PlayerConfig::load(cli.config.as_deref())?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter_or_default().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command.unwrap_or(Commands::Listen) {
        Commands::Listen => listen::run(&config).await?,
        Commands::Info { json } => {
            let info = station_info();
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{}", render_station(&info));
            }
        }
        Commands::Links { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&LINKS)?);
            } else {
                println!("{}", render_links(&LINKS));
            }
        }
        Commands::Status { json } => {
            let probe = TcpProbe::new(
                config.connectivity.probe_address.clone(),
                config.connectivity.probe_timeout(),
            );
            let mut monitor = ConnectivityMonitor::new(probe);
            monitor.poll_once().await;
            let status = monitor.current().unwrap_or_default();

            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("{}", render_connectivity(&status));
            }
        }
    }

    Ok(())
}
