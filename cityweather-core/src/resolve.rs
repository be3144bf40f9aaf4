//! Mapping user input onto a [`CityDirectory`] entry.
//!
//! Matching is exact after case folding: there is no fuzzy or partial
//! matching and no ranking.

use crate::city::{City, CityDirectory};

/// What the user asked for: a city picked by id, or free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityQuery {
    Id(u64),
    Text(String),
}

impl From<u64> for CityQuery {
    fn from(id: u64) -> Self {
        CityQuery::Id(id)
    }
}

impl From<&str> for CityQuery {
    fn from(text: &str) -> Self {
        CityQuery::Text(text.to_string())
    }
}

impl From<String> for CityQuery {
    fn from(text: String) -> Self {
        CityQuery::Text(text)
    }
}

impl std::fmt::Display for CityQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CityQuery::Id(id) => write!(f, "#{id}"),
            CityQuery::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Sorry, couldn't find that location: {query}")]
    NotFound { query: CityQuery },
}

/// Resolve a query against the directory.
///
/// Free text is tried, in order, as the `"dc"` shortcut, as a
/// `"name, state"` composite (when it contains a comma), and as a bare city
/// name. Bare names take the first match in dataset order.
pub fn resolve<'a>(directory: &'a CityDirectory, query: &CityQuery) -> Result<&'a City, ResolveError> {
    let found = match query {
        CityQuery::Id(id) => directory.get(*id),
        CityQuery::Text(text) => resolve_text(directory, text),
    };

    found.ok_or_else(|| ResolveError::NotFound { query: query.clone() })
}

fn resolve_text<'a>(directory: &'a CityDirectory, text: &str) -> Option<&'a City> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if needle == "dc" {
        return Some(directory.dc());
    }

    if needle.contains(',') {
        let needle = needle.replacen(", ", ",", 1);
        return directory.iter().find(|c| c.composite_key() == needle);
    }

    directory.iter().find(|c| c.name.to_lowercase() == needle)
}
