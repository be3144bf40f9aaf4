//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - The static US city directory and the resolver over it
//! - The OpenWeather current-conditions fetcher
//! - Normalization of provider payloads into display-ready records
//! - The per-search state machine driving a presentation layer
//! - Configuration & credentials handling
//!
//! It is used by `cityweather-cli`, but can also be reused by other binaries or services.

pub mod city;
pub mod config;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod resolve;
pub mod search;

pub use city::{City, CityDirectory, DirectoryError};
pub use config::Config;
pub use model::{
    ColorTag, CompassPoint, Condition, NormalizedForecast, RawForecast, Temperature,
    TemperatureUnit,
};
pub use provider::{FetchError, WeatherProvider, openweather::OpenWeatherProvider};
pub use resolve::{CityQuery, ResolveError, resolve};
pub use search::{
    SearchError, SearchEvent, SearchPhase, SearchSession, SearchState, SearchTicket, WeatherPipeline,
};
