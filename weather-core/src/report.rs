use tracing::{info, instrument};

use crate::{
    coordinates::CoordinateResolver,
    error::Result,
    format::format_weather,
    history::{WeatherStorage, save_weather},
    model::Weather,
    provider::WeatherProvider,
};

/// Outcome of one successful lookup.
#[derive(Debug, Clone)]
pub struct WeatherReport {
    pub weather: Weather,
    pub formatted: String,
}

/// Resolve coordinates, fetch weather, format it and record it in `storage`
/// when one is given.
///
/// Stops at the first failure, so nothing is stored unless every earlier step
/// succeeded.
#[instrument(skip_all)]
pub async fn report_weather(
    resolver: &CoordinateResolver,
    provider: &dyn WeatherProvider,
    storage: Option<&dyn WeatherStorage>,
) -> Result<WeatherReport> {
    let coordinates = resolver.resolve().await?;
    let weather = provider.get_weather(coordinates).await?;
    let formatted = format_weather(&weather);

    if let Some(storage) = storage {
        save_weather(&weather, storage)?;
        info!(city = %weather.city, "Weather saved to history");
    }

    Ok(WeatherReport { weather, formatted })
}
