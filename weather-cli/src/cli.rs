use std::fs;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, Select, Text};
use weather_core::{
    Config, CoordinateResolver, HistoryFormat, JsonFileWeatherStorage,
    history::storage_from_config, provider::provider_from_config, report_weather,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather by IP with a lookup history")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather for this machine's location (default).
    Show {
        /// Don't record this lookup in history.
        #[arg(long)]
        no_save: bool,
    },

    /// Interactively configure the API key and history settings.
    Configure,

    /// Print previously recorded lookups.
    History,

    /// Print the path of the config file.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Show { no_save: false }) {
            Command::Show { no_save } => show(no_save).await,
            Command::Configure => configure(),
            Command::History => history(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

async fn show(no_save: bool) -> anyhow::Result<()> {
    let config = Config::load()?;

    let resolver = CoordinateResolver::from_config(&config)?;
    let provider = provider_from_config(&config)?;
    let storage = if config.history.enabled && !no_save {
        Some(storage_from_config(&config.history)?)
    } else {
        None
    };

    let report = report_weather(&resolver, provider.as_ref(), storage.as_deref())
        .await
        .context("Weather lookup aborted")?;

    print!("{}", report.formatted);
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("OpenWeather API key:")
        .with_default(config.api_key.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    config.coordinates.round = Confirm::new("Round coordinates to one decimal?")
        .with_default(config.coordinates.round)
        .prompt()
        .context("Failed to read rounding choice")?;

    config.history.enabled = Confirm::new("Record lookups in history?")
        .with_default(config.history.enabled)
        .prompt()
        .context("Failed to read history choice")?;

    if config.history.enabled {
        let formats = vec!["json", "plain"];
        let start = match config.history.format {
            HistoryFormat::Json => 0,
            HistoryFormat::Plain => 1,
        };
        let choice = Select::new("History format:", formats)
            .with_starting_cursor(start)
            .prompt()
            .context("Failed to read history format")?;

        config.history.set_format(match choice {
            "plain" => HistoryFormat::Plain,
            _ => HistoryFormat::Json,
        });
    }

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn history() -> anyhow::Result<()> {
    let config = Config::load()?;
    let path = config.history.history_file_path()?;

    if !path.exists() {
        println!("No history yet ({}).", path.display());
        return Ok(());
    }

    match config.history.format {
        HistoryFormat::Json => {
            for record in JsonFileWeatherStorage::new(&path)?.records()? {
                println!("{}\n{}", record.date, record.weather);
            }
        }
        HistoryFormat::Plain => {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read history file: {}", path.display()))?;
            print!("{contents}");
        }
    }

    Ok(())
}
