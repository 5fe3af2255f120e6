//! Persistent log of weather lookups.
//!
//! Two interchangeable backends: an append-only plain text file and a JSON
//! array file. The JSON backend rewrites the whole file on every save, so it
//! assumes a single writer.

use std::{
    fmt::Debug,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;
use tracing::debug;

use crate::{
    config::{HistoryConfig, HistoryFormat},
    error::{Result, WeatherError},
    format::format_weather,
    model::{HistoryRecord, Weather},
};

pub trait WeatherStorage: Send + Sync + Debug {
    fn save(&self, weather: &Weather) -> Result<()>;
}

/// Store weather in a plain text file.
#[derive(Debug, Clone)]
pub struct PlainFileWeatherStorage {
    file: PathBuf,
}

impl PlainFileWeatherStorage {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }
}

impl WeatherStorage for PlainFileWeatherStorage {
    fn save(&self, weather: &Weather) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)
            .map_err(|e| failed(&self.file, "open", e))?;

        writeln!(file, "{}\n{}", now(), format_weather(weather))
            .map_err(|e| failed(&self.file, "append to", e))?;

        debug!(path = %self.file.display(), "Appended weather to plain history");
        Ok(())
    }
}

/// Store weather in a JSON file holding an array of [`HistoryRecord`].
#[derive(Debug, Clone)]
pub struct JsonFileWeatherStorage {
    jsonfile: PathBuf,
}

impl JsonFileWeatherStorage {
    /// Creates the file with an empty array if it doesn't exist yet.
    pub fn new(jsonfile: impl Into<PathBuf>) -> Result<Self> {
        let storage = Self {
            jsonfile: jsonfile.into(),
        };
        storage.init_storage()?;
        Ok(storage)
    }

    /// All records in insertion order.
    pub fn records(&self) -> Result<Vec<HistoryRecord>> {
        let contents =
            fs::read_to_string(&self.jsonfile).map_err(|e| failed(&self.jsonfile, "read", e))?;

        serde_json::from_str(&contents).map_err(|e| failed(&self.jsonfile, "parse", e))
    }

    fn init_storage(&self) -> Result<()> {
        if self.jsonfile.exists() {
            return Ok(());
        }
        fs::write(&self.jsonfile, "[]").map_err(|e| failed(&self.jsonfile, "create", e))
    }

    fn write_records(&self, records: &[HistoryRecord]) -> Result<()> {
        // serde_json leaves non-ASCII characters unescaped.
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| failed(&self.jsonfile, "serialize", e))?;

        fs::write(&self.jsonfile, json).map_err(|e| failed(&self.jsonfile, "write", e))
    }
}

impl WeatherStorage for JsonFileWeatherStorage {
    fn save(&self, weather: &Weather) -> Result<()> {
        let mut records = self.records()?;
        records.push(HistoryRecord {
            date: now(),
            weather: format_weather(weather),
        });
        self.write_records(&records)?;

        debug!(
            path = %self.jsonfile.display(),
            records = records.len(),
            "Appended weather to JSON history"
        );
        Ok(())
    }
}

pub fn save_weather(weather: &Weather, storage: &dyn WeatherStorage) -> Result<()> {
    storage.save(weather)
}

/// Construct the storage backend selected in config.
pub fn storage_from_config(config: &HistoryConfig) -> anyhow::Result<Box<dyn WeatherStorage>> {
    let path = config.history_file_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| failed(parent, "create directory for", e))?;
    }

    let boxed: Box<dyn WeatherStorage> = match config.format {
        HistoryFormat::Plain => Box::new(PlainFileWeatherStorage::new(path)),
        HistoryFormat::Json => Box::new(JsonFileWeatherStorage::new(path)?),
    };

    Ok(boxed)
}

fn now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

fn failed(path: &Path, action: &str, err: impl std::fmt::Display) -> WeatherError {
    let msg = format!("Failed to {action} history file {}: {err}", path.display());
    debug!("{msg}");
    WeatherError::StorageWriteFailed(msg)
}
