use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::{Condition, RawForecast};

use super::{FetchError, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn request_current(&self, city_id: u64) -> Result<RawForecast> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let id = city_id.to_string();

        tracing::debug!(city_id, url = %url, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("id", id.as_str()),
                ("units", "imperial"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            // The request URL carries the API key.
            .map_err(reqwest::Error::without_url)
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        parsed.into_raw()
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    timezone: i32,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

impl OwCurrentResponse {
    fn into_raw(self) -> Result<RawForecast> {
        let weather = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenWeather response contained no weather condition"))?;

        Ok(RawForecast {
            location_name: self.name,
            temperature_f: self.main.temp,
            feels_like_f: self.main.feels_like,
            humidity_pct: self.main.humidity,
            wind_speed_mph: self.wind.speed,
            wind_deg: self.wind.deg,
            sunrise: self.sys.sunrise,
            sunset: self.sys.sunset,
            timezone_offset_secs: self.timezone,
            condition: Condition {
                main: weather.main,
                description: weather.description,
                icon: weather.icon,
            },
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, city_id: u64) -> Result<RawForecast, FetchError> {
        self.request_current(city_id).await.map_err(|err| {
            tracing::warn!(city_id, error = %format!("{err:#}"), "weather fetch failed");
            FetchError::from(err)
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
