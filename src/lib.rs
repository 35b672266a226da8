pub mod app_settings_commands;
pub mod cli;
pub mod config;
pub mod db;
pub mod faq;
pub mod labels;
pub mod settings;
pub mod tickets;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Serialize;

use cli::{Cli, Command};
use config::Config;
use db::Database;
use settings::SettingsStore;

pub struct AppState {
    pub(crate) db: Database,
    pub(crate) settings: SettingsStore,
}

impl AppState {
    pub fn open(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("failed to create data directory {}", config.data_dir.display())
        })?;

        Ok(Self {
            db: Database::new(config.database_path())?,
            settings: SettingsStore::new(config.settings_path())?,
        })
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Dispatches one read-only command and prints its result as JSON.
async fn dispatch(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Overview { query } => {
            let overview =
                tickets::commands::get_ticket_overview(state, query.as_deref().unwrap_or_default())
                    .await
                    .map_err(anyhow::Error::msg)?;
            print_json(&overview)
        }
        Command::Labels => print_json(
            &labels::commands::get_labels(state)
                .await
                .map_err(anyhow::Error::msg)?,
        ),
        Command::FormLabels => print_json(
            &labels::commands::get_form_labels(state)
                .await
                .map_err(anyhow::Error::msg)?,
        ),
        Command::Faq => print_json(
            &faq::commands::get_qaps(state)
                .await
                .map_err(anyhow::Error::msg)?,
        ),
        Command::Settings => print_json(&app_settings_commands::get_app_settings(state)),
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = Config::from_env()?;
    info!(
        "Kummerkasten starting up ({:?}, data in {})",
        config.environment,
        config.data_dir.display()
    );

    let state = AppState::open(&config)?;
    if config.is_dev() {
        db::seed::seed_dev_data(&state.db).await?;
    }

    dispatch(&state, cli.command).await
}
