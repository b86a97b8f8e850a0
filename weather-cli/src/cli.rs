use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use weather_core::{
    Config, FileStore, KeyValueStore, LocationCandidate, MemoryStore, SearchAndDisplayController,
    WeatherApiClient, WeatherSource,
};

use crate::{render, screen};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather lookup with city search")]
pub struct Cli {
    /// Don't read or remember the last viewed city.
    #[arg(long, global = true)]
    pub no_persist: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key in the config file.
    Configure,

    /// Print current conditions and the 7-day forecast once.
    Show {
        /// City name; defaults to the last viewed city.
        city: Option<String>,
    },

    /// List locations matching a query.
    Search {
        query: String,
    },

    /// Interactive screen with debounced city search (the default).
    Interactive,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(),
            Command::Show { city } => {
                let ctrl = controller(self.no_persist)?;
                show(&ctrl, city).await
            }
            Command::Search { query } => search(&query).await,
            Command::Interactive => screen::run(controller(self.no_persist)?).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut cfg = Config::load()?;

    let key = inquire::Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let key = key.trim();
    if key.is_empty() {
        bail!("API key must not be empty");
    }

    cfg.set_api_key(key.to_string());
    cfg.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

fn client() -> Result<WeatherApiClient> {
    let cfg = Config::load()?;
    let api_key = cfg.resolve_api_key()?;
    Ok(WeatherApiClient::with_base_url(api_key, cfg.base_url()))
}

fn controller(no_persist: bool) -> Result<SearchAndDisplayController> {
    let store: Arc<dyn KeyValueStore> = if no_persist {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::open_default()?)
    };

    Ok(SearchAndDisplayController::new(Arc::new(client()?), store))
}

async fn show(ctrl: &SearchAndDisplayController, city: Option<String>) -> Result<()> {
    let target = match city {
        Some(city) => {
            ctrl.select_location(&LocationCandidate::named(city.as_str())).await;
            city
        }
        None => {
            ctrl.mount().await;
            "the last viewed city".to_string()
        }
    };

    let Some(payload) = ctrl.state().weather else {
        bail!("Could not fetch the forecast for {target}. Run with RUST_LOG=warn for details.");
    };

    print!("{}", render::weather(&payload, Local::now().date_naive()));
    Ok(())
}

async fn search(query: &str) -> Result<()> {
    let candidates = client()?
        .fetch_location(query)
        .await
        .with_context(|| format!("Location search for '{query}' failed"))?;

    if candidates.is_empty() {
        println!("No locations match '{query}'.");
    } else {
        print!("{}", render::candidates(&candidates));
    }
    Ok(())
}
