use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// IP-geolocation endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatesConfig {
    /// Must answer with JSON containing `"loc": "<lat>,<lon>"`.
    pub url: String,
    /// Round coordinates to one decimal before asking for weather.
    pub round: bool,
}

impl Default for CoordinatesConfig {
    fn default() -> Self {
        Self {
            url: "https://ipinfo.io/json".to_string(),
            round: true,
        }
    }
}

/// Weather endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherApiConfig {
    /// `{lat}`, `{lon}` and `{api_key}` are substituted per request.
    pub url_template: String,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            url_template: "https://api.openweathermap.org/data/2.5/weather?\
                           lat={lat}&lon={lon}&appid={api_key}&lang=ru&units=metric"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFormat {
    Plain,
    #[default]
    Json,
}

impl HistoryFormat {
    /// File name used when the history path was never customised.
    pub fn default_file_name(self) -> &'static str {
        match self {
            HistoryFormat::Plain => "history.txt",
            HistoryFormat::Json => "history.json",
        }
    }
}

/// Where and how weather lookups are recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    pub format: HistoryFormat,
    /// Relative paths are resolved against the platform data directory.
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: HistoryFormat::Json,
            path: PathBuf::from(HistoryFormat::Json.default_file_name()),
        }
    }
}

impl HistoryConfig {
    /// Switch the storage format. The path follows only while it is still the
    /// previous format's default file name; a custom path is kept.
    pub fn set_format(&mut self, format: HistoryFormat) {
        if format == self.format {
            return;
        }
        if self.path == Path::new(self.format.default_file_name()) {
            self.path = PathBuf::from(format.default_file_name());
        }
        self.format = format;
    }

    /// Absolute location of the history file.
    pub fn history_file_path(&self) -> Result<PathBuf> {
        if self.path.is_absolute() {
            return Ok(self.path.clone());
        }

        Ok(project_dirs()?.data_dir().join(&self.path))
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    /// Timeout applied to both HTTP calls.
    pub timeout_secs: u64,

    pub coordinates: CoordinatesConfig,
    pub weather: WeatherApiConfig,
    pub history: HistoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout_secs: 10,
            coordinates: CoordinatesConfig::default(),
            weather: WeatherApiConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// API key from the environment if set, otherwise from the config file.
    pub fn api_key(&self) -> Result<String> {
        if let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()) {
            return Ok(key);
        }

        self.stored_api_key().map(str::to_owned).ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weather configure` or set {API_KEY_ENV}."
            )
        })
    }

    fn stored_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-task", "weather-cli")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
