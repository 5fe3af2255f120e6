use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Geographic position resolved from the caller's IP address.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components rounded to one decimal place, ties to even on the
    /// exact binary value (0.25 -> 0.2, 0.35 -> 0.3).
    pub fn rounded(self) -> Self {
        Self {
            latitude: round_to_tenth(self.latitude),
            longitude: round_to_tenth(self.longitude),
        }
    }
}

fn round_to_tenth(value: f64) -> f64 {
    // Float formatting rounds the exact decimal expansion, ties to even.
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Coarse weather category derived from a provider condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherCategory {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Clear,
    Atmosphere,
    Clouds,
}

/// Checked in order, first match wins: "800" has to precede "80".
const CONDITION_PREFIXES: &[(&str, WeatherCategory)] = &[
    ("2", WeatherCategory::Thunderstorm),
    ("3", WeatherCategory::Drizzle),
    ("5", WeatherCategory::Rain),
    ("6", WeatherCategory::Snow),
    ("7", WeatherCategory::Atmosphere),
    ("800", WeatherCategory::Clear),
    ("80", WeatherCategory::Clouds),
];

impl WeatherCategory {
    /// Classify an OpenWeather condition code in its textual form, `None` if
    /// no prefix matches.
    pub fn from_condition_code(code: &str) -> Option<Self> {
        CONDITION_PREFIXES
            .iter()
            .find(|(prefix, _)| code.starts_with(prefix))
            .map(|(_, category)| *category)
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeatherCategory::Thunderstorm => "Гроза",
            WeatherCategory::Drizzle => "Изморось",
            WeatherCategory::Rain => "Дождь",
            WeatherCategory::Snow => "Снег",
            WeatherCategory::Clear => "Ясно",
            WeatherCategory::Atmosphere => "Туман",
            WeatherCategory::Clouds => "Облачно",
        }
    }
}

impl std::fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Current weather at the resolved location.
#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    /// Degrees Celsius.
    pub temperature: i32,
    pub category: WeatherCategory,
    pub sunrise: DateTime<Local>,
    pub sunset: DateTime<Local>,
    pub city: String,
}

/// One entry of the JSON history file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: String,
    pub weather: String,
}
