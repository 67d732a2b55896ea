// Copyright (c) 2026 Kasegi. All rights reserved.

mod api;
mod config;
mod consts;
mod environment;
mod error_classifier;
mod events;
mod logging;
mod models;
mod runtime;
mod session;
mod ui;

use crate::config::{Config, get_config_path};
use crate::consts::cli_consts::headless;
use crate::environment::Environment;
use crate::session::{run_headless_mode, run_tui_mode, setup_session};
use clap::{Parser, Subcommand};
use std::error::Error;

#[derive(Parser)]
/// Command-line arguments
#[command(author, version, long_about = None)]
struct Args {
    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the dashboard client
    Start {
        /// Tracker service URL, overriding the saved configuration.
        #[arg(long, value_name = "BASE_URL")]
        base_url: Option<String>,

        /// Run without the terminal UI, printing events to stdout.
        #[arg(long)]
        headless: bool,

        /// Seconds between snapshot refreshes in headless mode.
        #[arg(long, default_value_t = headless::DEFAULT_REFRESH_SECS)]
        refresh_secs: u64,
    },
    /// Save the tracker service URL to the configuration file.
    SetUrl {
        /// Tracker service URL, e.g. http://localhost:5000
        #[arg(long, value_name = "BASE_URL")]
        base_url: String,
    },
    /// Delete the saved configuration file.
    ClearConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let kasegi_environment_str = std::env::var("KASEGI_ENVIRONMENT").unwrap_or_default();
    let environment = kasegi_environment_str
        .parse::<Environment>()
        .unwrap_or(Environment::default());

    let config_path = get_config_path()?;
    let args = Args::parse();
    match args.command {
        Command::Start {
            base_url,
            headless,
            refresh_secs,
        } => {
            // An explicit URL wins over the saved config, which wins over the
            // environment default.
            let mut base_url = base_url;
            if base_url.is_none() && config_path.exists() {
                if let Ok(config) = Config::load_from_file(&config_path) {
                    base_url = Some(config.base_url);
                }
            }
            let environment = match base_url {
                Some(base_url) => Environment::Custom { base_url },
                None => environment,
            };

            let session = setup_session(environment)?;
            if headless {
                run_headless_mode(session, refresh_secs).await
            } else {
                run_tui_mode(session).await
            }
        }
        Command::SetUrl { base_url } => {
            let config = Config::new(base_url);
            config
                .save(&config_path)
                .map_err(|e| format!("Failed to save config: {}", e))?;
            println!("Saved service URL to {}", config_path.display());
            Ok(())
        }
        Command::ClearConfig => {
            println!("Clearing saved configuration file...");
            Config::clear(&config_path).map_err(Into::into)
        }
    }
}
