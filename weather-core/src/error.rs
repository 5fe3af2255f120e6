use thiserror::Error;

/// Failure kinds surfaced by the core.
///
/// Each variant is opaque to callers: the message is diagnostic only and the
/// variant alone tells which stage of the pipeline failed.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Geolocation request failed or its body could not be parsed.
    #[error("Can't get coordinates: {0}")]
    CoordinateResolutionFailed(String),

    /// Weather request failed or its body could not be parsed.
    #[error("Can't get weather from API service: {0}")]
    WeatherFetchFailed(String),

    /// History record could not be persisted.
    #[error("Can't save weather to history: {0}")]
    StorageWriteFailed(String),
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
