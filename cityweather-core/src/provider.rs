use crate::{Config, RawForecast, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// The one failure a fetch can report.
///
/// Transport errors, non-success statuses and malformed payloads all land
/// here; the cause is kept as `source` for logging only.
#[derive(Debug, thiserror::Error)]
#[error("Couldn't get weather for that location")]
pub struct FetchError(#[from] anyhow::Error);

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for a provider city id, in imperial units.
    async fn fetch_current(&self, city_id: u64) -> Result<RawForecast, FetchError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;
    let provider = match config.base_url.as_deref() {
        Some(base_url) => OpenWeatherProvider::with_base_url(api_key, base_url),
        None => OpenWeatherProvider::new(api_key),
    };

    Ok(Box::new(provider))
}
