//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Coordinate lookup by IP and the weather provider abstraction
//! - Report formatting and the weather history backends
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod coordinates;
pub mod error;
pub mod format;
pub mod history;
pub mod model;
pub mod provider;
pub mod report;

pub use config::{Config, HistoryConfig, HistoryFormat};
pub use coordinates::CoordinateResolver;
pub use error::{Result, WeatherError};
pub use format::format_weather;
pub use history::{JsonFileWeatherStorage, PlainFileWeatherStorage, WeatherStorage, save_weather};
pub use model::{Coordinates, HistoryRecord, Weather, WeatherCategory};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use report::{WeatherReport, report_weather};
