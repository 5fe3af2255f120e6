use crate::{Config, Coordinates, Weather, error::Result, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(&self, coordinates: Coordinates) -> Result<Weather>;
}

/// Construct the weather provider from config.
///
/// Fails when no API key is available, with a hint on how to configure one.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;
    let provider = OpenWeatherProvider::from_config(config, api_key)?;

    Ok(Box::new(provider))
}
