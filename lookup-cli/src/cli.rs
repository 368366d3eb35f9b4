use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tokio::sync::watch;
use tracing::debug;
use weather_lookup_core::{
    Config, LookupStatus, StatusView, WeatherLookup, provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-lookup", version, about = "Look up current weather by city")]
pub struct Cli {
    /// API key to use for this run instead of the stored one.
    #[arg(long, global = true, env = "WEATHER_LOOKUP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Log lookup progress to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the provider API key (and optionally a custom endpoint).
    Configure,

    /// Show current weather for a single city.
    Show {
        /// City name, e.g. "London" or "São Paulo".
        city: String,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Prompt for cities until cancelled (Esc or Ctrl-C). The default.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { city, json } => {
                let mut lookup = build_lookup(self.api_key)?;
                lookup.set_city_name(city);

                let status = submit_with_indicator(&lookup, !json).await;
                let view = StatusView::from(&status);

                if json {
                    println!("{}", serde_json::to_string_pretty(&view)?);
                } else {
                    println!("{}", render::render_view(&view));
                }

                Ok(match status {
                    LookupStatus::Failed { .. } => ExitCode::FAILURE,
                    _ => ExitCode::SUCCESS,
                })
            }
            Command::Interactive => {
                let lookup = build_lookup(self.api_key)?;
                interactive(lookup).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn build_lookup(api_key: Option<String>) -> anyhow::Result<WeatherLookup> {
    let mut config = Config::load()?;
    if let Some(key) = api_key {
        config.set_api_key(key);
    }

    let provider = provider_from_config(&config)?;
    Ok(WeatherLookup::new(Arc::from(provider)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Find it at https://home.openweathermap.org/api_keys")
        .prompt()
        .context("API key prompt was cancelled")?;

    let base_url = Text::new("Provider base URL:")
        .with_default(&config.provider.base_url)
        .prompt()
        .context("Base URL prompt was cancelled")?;

    config.set_api_key(api_key.trim());
    config.provider.base_url = base_url.trim().to_string();

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

/// Each answered prompt is a submit, like pressing Enter in the search field.
async fn interactive(mut lookup: WeatherLookup) -> anyhow::Result<()> {
    loop {
        let answer = Text::new("City:")
            .with_initial_value(lookup.city_name())
            .with_help_message("Enter to search, Esc to quit")
            .prompt();

        let city = match answer {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                debug!("interactive session ended");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        lookup.set_city_name(city);
        let status = submit_with_indicator(&lookup, true).await;
        println!("{}\n", render::render_view(&StatusView::from(&status)));
    }
}

/// Runs one lookup, printing the loading line when the status enters `Loading`.
async fn submit_with_indicator(lookup: &WeatherLookup, show_indicator: bool) -> LookupStatus {
    let updates = lookup.subscribe();
    let (status, ()) = tokio::join!(lookup.submit_lookup(), loading_indicator(updates, show_indicator));
    status
}

async fn loading_indicator(mut updates: watch::Receiver<LookupStatus>, enabled: bool) {
    if updates.changed().await.is_err() {
        return;
    }
    if enabled && updates.borrow_and_update().is_loading() {
        eprintln!("{}", render::LOADING_LINE);
    }
}
