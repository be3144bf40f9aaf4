use anyhow::{Context, Result, anyhow, bail};
use chrono::{FixedOffset, Local};
use clap::{Parser, Subcommand};
use cityweather_core::{
    City, CityQuery, Config, NormalizedForecast, SearchEvent, SearchSession, SearchState,
    TemperatureUnit, WeatherPipeline, WeatherProvider, provider::provider_from_config,
};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use std::sync::Arc;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather for US cities")]
pub struct Cli {
    /// Without a subcommand, start an interactive search prompt.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and the default unit.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, "City, ST", or "dc".
        #[arg(required_unless_present = "id")]
        city: Option<String>,

        /// Look the city up by its id instead of by name.
        #[arg(long, conflicts_with = "city")]
        id: Option<u64>,

        /// Temperature unit: f or c. Defaults to the configured unit.
        #[arg(long, short)]
        unit: Option<TemperatureUnit>,

        /// Print the normalized record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List known cities.
    Cities {
        /// Only cities in this state, e.g. "TX".
        #[arg(long)]
        state: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Show { city, id, unit, json }) => {
                let query = match (id, city) {
                    (Some(id), _) => CityQuery::Id(id),
                    (None, Some(text)) => CityQuery::Text(text),
                    (None, None) => bail!("Give a city name or --id"),
                };
                show(query, unit, json).await
            }
            Some(Command::Cities { state }) => list_cities(state.as_deref()),
            None => interactive().await,
        }
    }
}

fn build_pipeline(config: &Config) -> Result<WeatherPipeline> {
    let directory = Arc::new(config.load_directory()?);
    let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(config)?);

    Ok(WeatherPipeline::new(directory, provider, viewer_offset()))
}

fn viewer_offset() -> FixedOffset {
    *Local::now().offset()
}

/// Drive one search through the session and hand back its terminal state.
async fn run_search(
    pipeline: &WeatherPipeline,
    session: &mut SearchSession,
    query: CityQuery,
    show_progress: bool,
) -> SearchState {
    let ticket = session.begin(query.clone());

    pipeline
        .run(&query, |event| {
            if show_progress && matches!(event, SearchEvent::Resolved(_)) {
                eprintln!("Loading...");
            }
            session.apply(ticket, event);
        })
        .await;

    session.take_state()
}

async fn show(query: CityQuery, unit: Option<TemperatureUnit>, json: bool) -> Result<()> {
    let config = Config::load()?;
    let pipeline = build_pipeline(&config)?;
    let unit = unit.unwrap_or(config.units);

    let mut session = SearchSession::new();
    match run_search(&pipeline, &mut session, query, !json).await {
        SearchState::Normalized { city, forecast } => {
            if json {
                let out = render::forecast_json(&city, &forecast, unit)
                    .context("Failed to serialize forecast to JSON")?;
                println!("{out}");
            } else {
                println!("{}", render::forecast_card(&city, &forecast, unit));
            }
            Ok(())
        }
        SearchState::NotFound { error } => Err(error.into()),
        SearchState::FetchFailed { city, error } => Err(anyhow!("{error} ({city})")),
        other => Err(anyhow!("Search ended unexpectedly in phase {:?}", other.phase())),
    }
}

/// What to do after a forecast has been shown.
#[derive(Debug, Clone, Copy)]
enum NextStep {
    SwitchUnit(TemperatureUnit),
    NewSearch,
    Quit,
}

impl std::fmt::Display for NextStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NextStep::SwitchUnit(unit) => write!(f, "Show in {unit}"),
            NextStep::NewSearch => f.write_str("New search"),
            NextStep::Quit => f.write_str("Quit"),
        }
    }
}

async fn interactive() -> Result<()> {
    let config = Config::load()?;
    let pipeline = build_pipeline(&config)?;
    let mut unit = config.units;
    let mut session = SearchSession::new();

    loop {
        let input = match Text::new("Where are you located?").prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        if input.trim().is_empty() {
            continue;
        }

        match run_search(&pipeline, &mut session, CityQuery::Text(input), true).await {
            SearchState::Normalized { city, forecast } => {
                if matches!(browse_forecast(&city, &forecast, &mut unit)?, NextStep::Quit) {
                    break;
                }
            }
            SearchState::NotFound { error } => println!("{error}"),
            SearchState::FetchFailed { city, error } => println!("{error} ({city})"),
            other => tracing::debug!(phase = ?other.phase(), "search did not finish"),
        }
    }

    Ok(())
}

/// Show a forecast and let the user flip units until they move on.
fn browse_forecast(
    city: &City,
    forecast: &NormalizedForecast,
    unit: &mut TemperatureUnit,
) -> Result<NextStep> {
    loop {
        println!("{}\n", render::forecast_card(city, forecast, *unit));

        let options = vec![
            NextStep::SwitchUnit(unit.toggled()),
            NextStep::NewSearch,
            NextStep::Quit,
        ];

        let step = match Select::new("Next:", options).prompt() {
            Ok(step) => step,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(NextStep::Quit);
            }
            Err(err) => return Err(err.into()),
        };

        match step {
            NextStep::SwitchUnit(next) => *unit = next,
            other => return Ok(other),
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let mut prompt = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked);
    if config.api_key.is_some() {
        prompt = prompt.with_help_message("Leave empty to keep the current key");
    }

    let key = prompt.prompt()?;
    let key = key.trim();
    if !key.is_empty() {
        config.set_api_key(key.to_string());
    } else if config.api_key.is_none() {
        bail!("An API key is required. Get one at https://openweathermap.org/api");
    }

    let units = TemperatureUnit::all().to_vec();
    let cursor = units.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Default temperature unit:", units)
        .with_starting_cursor(cursor)
        .prompt()?;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

fn list_cities(state: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let directory = config.load_directory()?;

    let cities: Vec<&City> = match state {
        Some(state) => directory.in_state(state).collect(),
        None => directory.iter().collect(),
    };

    if cities.is_empty() {
        println!("No cities found");
    }

    for city in cities {
        println!("{:>9}  {city}", city.id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_by_name() {
        let cli = Cli::try_parse_from(["cityweather", "show", "New Orleans, LA", "--unit", "c"]).unwrap();
        match cli.command {
            Some(Command::Show { city, id, unit, json }) => {
                assert_eq!(city.as_deref(), Some("New Orleans, LA"));
                assert_eq!(id, None);
                assert_eq!(unit, Some(TemperatureUnit::Celsius));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_by_id() {
        let cli = Cli::try_parse_from(["cityweather", "show", "--id", "4887398", "--json"]).unwrap();
        match cli.command {
            Some(Command::Show { city, id, json, .. }) => {
                assert!(city.is_none());
                assert_eq!(id, Some(4887398));
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_requires_city_or_id() {
        assert!(Cli::try_parse_from(["cityweather", "show"]).is_err());
    }

    #[test]
    fn show_rejects_city_and_id_together() {
        assert!(Cli::try_parse_from(["cityweather", "show", "Chicago", "--id", "1"]).is_err());
    }

    #[test]
    fn show_rejects_unknown_unit() {
        assert!(Cli::try_parse_from(["cityweather", "show", "Chicago", "--unit", "k"]).is_err());
    }

    #[test]
    fn no_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["cityweather"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn next_step_labels() {
        assert_eq!(NextStep::SwitchUnit(TemperatureUnit::Celsius).to_string(), "Show in °C");
        assert_eq!(NextStep::NewSearch.to_string(), "New search");
    }
}
