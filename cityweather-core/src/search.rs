//! One search, end to end: resolve the input, fetch, normalize.
//!
//! The pipeline reports progress as [`SearchEvent`]s. Folding those events
//! with [`SearchState::apply`] walks the per-search state machine:
//!
//! ```text
//! Idle -> Resolving -> NotFound
//!                   -> Fetching -> FetchFailed
//!                               -> Normalized
//! ```
//!
//! [`SearchSession`] keeps the state for a presentation layer that may start
//! a new search before the previous one finished. The latest search wins:
//! events from an older search are dropped, nothing is cancelled.

use chrono::FixedOffset;
use std::sync::Arc;

use crate::{
    city::{City, CityDirectory},
    model::NormalizedForecast,
    normalize::normalize,
    provider::{FetchError, WeatherProvider},
    resolve::{CityQuery, ResolveError, resolve},
};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    NotFound(#[from] ResolveError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Debug)]
pub enum SearchEvent {
    Started(CityQuery),
    Resolved(City),
    NotFound(ResolveError),
    FetchFailed(FetchError),
    Normalized(NormalizedForecast),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Resolving,
    NotFound,
    Fetching,
    FetchFailed,
    Normalized,
}

#[derive(Debug, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Resolving {
        query: CityQuery,
    },
    NotFound {
        error: ResolveError,
    },
    Fetching {
        city: City,
    },
    FetchFailed {
        city: City,
        error: FetchError,
    },
    Normalized {
        city: City,
        forecast: NormalizedForecast,
    },
}

impl SearchState {
    pub fn phase(&self) -> SearchPhase {
        match self {
            SearchState::Idle => SearchPhase::Idle,
            SearchState::Resolving { .. } => SearchPhase::Resolving,
            SearchState::NotFound { .. } => SearchPhase::NotFound,
            SearchState::Fetching { .. } => SearchPhase::Fetching,
            SearchState::FetchFailed { .. } => SearchPhase::FetchFailed,
            SearchState::Normalized { .. } => SearchPhase::Normalized,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.phase(),
            SearchPhase::NotFound | SearchPhase::FetchFailed | SearchPhase::Normalized
        )
    }

    /// The resolved city, once resolution succeeded.
    pub fn city(&self) -> Option<&City> {
        match self {
            SearchState::Fetching { city }
            | SearchState::FetchFailed { city, .. }
            | SearchState::Normalized { city, .. } => Some(city),
            _ => None,
        }
    }

    /// Advance the state machine. `Started` restarts from any state; an
    /// event that does not fit the current phase leaves the state unchanged.
    pub fn apply(self, event: SearchEvent) -> SearchState {
        match (self, event) {
            (_, SearchEvent::Started(query)) => SearchState::Resolving { query },
            (SearchState::Resolving { .. }, SearchEvent::Resolved(city)) => {
                SearchState::Fetching { city }
            }
            (SearchState::Resolving { .. }, SearchEvent::NotFound(error)) => {
                SearchState::NotFound { error }
            }
            (SearchState::Fetching { city }, SearchEvent::FetchFailed(error)) => {
                SearchState::FetchFailed { city, error }
            }
            (SearchState::Fetching { city }, SearchEvent::Normalized(forecast)) => {
                SearchState::Normalized { city, forecast }
            }
            (state, event) => {
                tracing::debug!(phase = ?state.phase(), ?event, "ignoring out-of-order search event");
                state
            }
        }
    }

    /// Collapse a terminal state into the pipeline's result.
    pub fn into_result(self) -> Option<Result<(City, NormalizedForecast), SearchError>> {
        match self {
            SearchState::NotFound { error } => Some(Err(error.into())),
            SearchState::FetchFailed { error, .. } => Some(Err(error.into())),
            SearchState::Normalized { city, forecast } => Some(Ok((city, forecast))),
            _ => None,
        }
    }
}

/// Identifies one search within a [`SearchSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

#[derive(Debug, Default)]
pub struct SearchSession {
    generation: u64,
    state: SearchState,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new search, replacing whatever the previous one left behind.
    pub fn begin(&mut self, query: CityQuery) -> SearchTicket {
        self.generation += 1;
        self.state = SearchState::Idle.apply(SearchEvent::Started(query));
        SearchTicket(self.generation)
    }

    /// Apply an event on behalf of `ticket`. Returns false, and changes
    /// nothing, when a newer search has started since.
    pub fn apply(&mut self, ticket: SearchTicket, event: SearchEvent) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, current = self.generation, "dropping stale search event");
            return false;
        }

        let state = std::mem::take(&mut self.state);
        self.state = state.apply(event);
        true
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.generation
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn take_state(&mut self) -> SearchState {
        std::mem::take(&mut self.state)
    }
}

/// Resolver, fetcher and normalizer wired together.
#[derive(Debug, Clone)]
pub struct WeatherPipeline {
    directory: Arc<CityDirectory>,
    provider: Arc<dyn WeatherProvider>,
    viewer_offset: FixedOffset,
}

impl WeatherPipeline {
    pub fn new(
        directory: Arc<CityDirectory>,
        provider: Arc<dyn WeatherProvider>,
        viewer_offset: FixedOffset,
    ) -> Self {
        Self { directory, provider, viewer_offset }
    }

    pub fn resolve(&self, query: &CityQuery) -> Result<&City, ResolveError> {
        resolve(&self.directory, query)
    }

    /// Fetch and normalize current conditions for an already resolved city.
    pub async fn forecast(&self, city: &City) -> Result<NormalizedForecast, FetchError> {
        let raw = self.provider.fetch_current(city.id).await?;
        Ok(normalize(&raw, self.viewer_offset))
    }

    /// Run one search, reporting every step after `Started` to `emit`.
    /// No fetch is attempted unless the query resolved.
    pub async fn run<F>(&self, query: &CityQuery, mut emit: F)
    where
        F: FnMut(SearchEvent),
    {
        let city = match self.resolve(query) {
            Ok(city) => city.clone(),
            Err(error) => {
                tracing::debug!(%query, "no matching city");
                emit(SearchEvent::NotFound(error));
                return;
            }
        };

        tracing::debug!(city = %city, id = city.id, "resolved city");
        emit(SearchEvent::Resolved(city.clone()));

        match self.forecast(&city).await {
            Ok(forecast) => emit(SearchEvent::Normalized(forecast)),
            Err(error) => emit(SearchEvent::FetchFailed(error)),
        }
    }

    /// Run a search to completion and return its terminal state.
    pub async fn search(&self, query: CityQuery) -> SearchState {
        let mut state = SearchState::Idle.apply(SearchEvent::Started(query.clone()));
        self.run(&query, |event| {
            state = std::mem::take(&mut state).apply(event);
        })
        .await;
        state
    }
}
