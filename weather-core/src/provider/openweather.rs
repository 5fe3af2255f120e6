use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    config::Config,
    error::{Result, WeatherError},
    model::{Coordinates, Weather, WeatherCategory},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    url_template: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, url_template: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| failed(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            url_template,
            http,
        })
    }

    pub fn from_config(config: &Config, api_key: String) -> Result<Self> {
        Self::new(
            api_key,
            config.weather.url_template.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn request_url(&self, coordinates: Coordinates) -> String {
        self.url_template
            .replace("{lat}", &coordinates.latitude.to_string())
            .replace("{lon}", &coordinates.longitude.to_string())
            .replace("{api_key}", &self.api_key)
    }

    async fn fetch_current(&self, coordinates: Coordinates) -> Result<String> {
        let url = self.request_url(coordinates);

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| failed(format!("Failed to send request to OpenWeather: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| failed(format!("Failed to read OpenWeather response body: {e}")))?;

        if !status.is_success() {
            return Err(failed(format!(
                "OpenWeather request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    /// Usually an integer, but any scalar is classified by its text.
    id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    sys: OwSys,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), fields(lat = %coordinates.latitude, lon = %coordinates.longitude))]
    async fn get_weather(&self, coordinates: Coordinates) -> Result<Weather> {
        let body = self.fetch_current(coordinates).await?;
        let weather = parse_openweather_response(&body)?;
        debug!(?weather, "Parsed OpenWeather response");

        Ok(weather)
    }
}

/// Parse an OpenWeather "current weather" body.
pub fn parse_openweather_response(body: &str) -> Result<Weather> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|e| failed(format!("Failed to parse OpenWeather JSON: {e}")))?;

    let id = parsed
        .weather
        .first()
        .ok_or_else(|| failed("OpenWeather response contained no weather conditions".into()))?
        .id
        .as_ref()
        .ok_or_else(|| failed("OpenWeather condition has no `id`".into()))?;

    let code = match id {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => return Err(failed(format!("Unexpected OpenWeather condition id {other}"))),
    };

    let category = WeatherCategory::from_condition_code(&code)
        .ok_or_else(|| failed(format!("Unknown OpenWeather condition code {code}")))?;

    Ok(Weather {
        temperature: parsed.main.temp.round_ties_even() as i32,
        category,
        sunrise: unix_to_local(parsed.sys.sunrise)?,
        sunset: unix_to_local(parsed.sys.sunset)?,
        city: parsed.name,
    })
}

fn unix_to_local(ts: i64) -> Result<DateTime<Local>> {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(&Local))
        .ok_or_else(|| failed(format!("Timestamp {ts} is out of range")))
}

fn failed(msg: String) -> WeatherError {
    debug!("{msg}");
    WeatherError::WeatherFetchFailed(msg)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
