//! Coordinate lookup by the caller's public IP address.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    config::{Config, CoordinatesConfig},
    error::{Result, WeatherError},
    model::Coordinates,
};

#[derive(Debug, Clone)]
pub struct CoordinateResolver {
    config: CoordinatesConfig,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    loc: String,
}

impl CoordinateResolver {
    pub fn new(config: CoordinatesConfig, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| failed(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.coordinates.clone(), Duration::from_secs(config.timeout_secs))
    }

    /// Current coordinates, rounded when the config asks for it.
    #[instrument(skip(self), fields(url = %self.config.url))]
    pub async fn resolve(&self) -> Result<Coordinates> {
        let body = self.fetch_body().await?;
        let coordinates = parse_coordinates_response(&body)?;
        debug!(?coordinates, "Parsed coordinates");

        if self.config.round {
            return Ok(coordinates.rounded());
        }
        Ok(coordinates)
    }

    async fn fetch_body(&self) -> Result<String> {
        let res = self
            .http
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| failed(format!("Failed to send geolocation request: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| failed(format!("Failed to read geolocation response body: {e}")))?;

        if !status.is_success() {
            return Err(failed(format!("Geolocation request failed with status {status}")));
        }

        Ok(body)
    }
}

/// Parse an ipinfo-style body carrying `"loc": "<lat>,<lon>"`.
pub fn parse_coordinates_response(body: &str) -> Result<Coordinates> {
    let parsed: IpInfoResponse = serde_json::from_str(body)
        .map_err(|e| failed(format!("Failed to parse geolocation JSON: {e}")))?;

    let mut parts = parsed.loc.split(',');
    let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(failed(format!("Malformed `loc` value: {:?}", parsed.loc)));
    };

    Ok(Coordinates::new(parse_component(lat)?, parse_component(lon)?))
}

fn parse_component(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| failed(format!("Non-numeric coordinate {value:?}: {e}")))
}

fn failed(msg: String) -> WeatherError {
    debug!("{msg}");
    WeatherError::CoordinateResolutionFailed(msg)
}
