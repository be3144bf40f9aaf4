use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// Dataset shipped with the crate, used when no external `cities_path` is configured.
const BUNDLED_CITIES: &str = include_str!("../data/us_cities.json");

/// A single lookup target. The id is the provider's city id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct City {
    pub id: u64,
    pub name: String,
    pub state: String,
}

impl City {
    pub fn is_dc(&self) -> bool {
        self.state.eq_ignore_ascii_case("DC")
    }

    /// `"name,state"`, case-folded, the key composite text input is compared against.
    pub(crate) fn composite_key(&self) -> String {
        format!("{},{}", self.name.to_lowercase(), self.state.to_lowercase())
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.name, self.state)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Failed to read city dataset {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse city dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("City dataset is empty")]
    Empty,

    #[error("Duplicate city id {0} in city dataset")]
    DuplicateId(u64),

    #[error("City dataset must contain exactly one DC entry, found {0}")]
    DcEntries(usize),
}

/// Immutable set of known cities.
///
/// Validated once on construction: ids are unique and exactly one entry
/// belongs to DC, so the `"dc"` shortcut always has a single target.
#[derive(Debug, Clone)]
pub struct CityDirectory {
    cities: Vec<City>,
    by_id: HashMap<u64, usize>,
    dc: usize,
}

impl CityDirectory {
    pub fn new(cities: Vec<City>) -> Result<Self, DirectoryError> {
        if cities.is_empty() {
            return Err(DirectoryError::Empty);
        }

        let mut by_id = HashMap::with_capacity(cities.len());
        for (idx, city) in cities.iter().enumerate() {
            if by_id.insert(city.id, idx).is_some() {
                return Err(DirectoryError::DuplicateId(city.id));
            }
        }

        let dc_entries: Vec<usize> = cities
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_dc())
            .map(|(idx, _)| idx)
            .collect();

        let dc = match dc_entries.as_slice() {
            [only] => *only,
            other => return Err(DirectoryError::DcEntries(other.len())),
        };

        tracing::info!(cities = cities.len(), "city directory loaded");

        Ok(Self { cities, by_id, dc })
    }

    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let cities: Vec<City> = serde_json::from_str(json)?;
        Self::new(cities)
    }

    pub fn from_path(path: &Path) -> Result<Self, DirectoryError> {
        let json = fs::read_to_string(path).map_err(|source| DirectoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The dataset compiled into the crate.
    pub fn bundled() -> Result<Self, DirectoryError> {
        Self::from_json(BUNDLED_CITIES)
    }

    pub fn get(&self, id: u64) -> Option<&City> {
        self.by_id.get(&id).map(|&idx| &self.cities[idx])
    }

    /// The single DC-state entry.
    pub fn dc(&self) -> &City {
        &self.cities[self.dc]
    }

    /// Cities in dataset order.
    pub fn iter(&self) -> impl Iterator<Item = &City> {
        self.cities.iter()
    }

    pub fn in_state<'a>(&'a self, state: &'a str) -> impl Iterator<Item = &'a City> + 'a {
        self.cities
            .iter()
            .filter(move |c| c.state.eq_ignore_ascii_case(state))
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(id: u64, name: &str, state: &str) -> City {
        City { id, name: name.to_string(), state: state.to_string() }
    }

    #[test]
    fn bundled_dataset_is_valid() {
        let dir = CityDirectory::bundled().expect("bundled dataset must load");
        assert!(dir.len() > 10);
        assert_eq!(dir.dc().state, "DC");
    }

    #[test]
    fn get_by_id() {
        let dir = CityDirectory::new(vec![city(1, "Chicago", "IL"), city(2, "Washington", "DC")])
            .unwrap();

        assert_eq!(dir.get(1).map(|c| c.name.as_str()), Some("Chicago"));
        assert!(dir.get(3).is_none());
    }

    #[test]
    fn rejects_empty_dataset() {
        let err = CityDirectory::new(Vec::new()).unwrap_err();
        assert!(matches!(err, DirectoryError::Empty));
    }

    #[test]
    fn rejects_missing_dc_entry() {
        let err = CityDirectory::new(vec![city(1, "Chicago", "IL")]).unwrap_err();
        assert!(matches!(err, DirectoryError::DcEntries(0)));
    }

    #[test]
    fn rejects_two_dc_entries() {
        let err = CityDirectory::new(vec![
            city(1, "Washington", "DC"),
            city(2, "Georgetown", "DC"),
        ])
        .unwrap_err();
        assert!(matches!(err, DirectoryError::DcEntries(2)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = CityDirectory::new(vec![
            city(7, "Washington", "DC"),
            city(7, "Chicago", "IL"),
        ])
        .unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateId(7)));
    }

    #[test]
    fn parse_error_is_reported() {
        let err = CityDirectory::from_json("{ not json").unwrap_err();
        assert!(err.to_string().contains("Failed to parse city dataset"));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.json");
        fs::write(
            &path,
            r#"[{"id": 10, "name": "Washington", "state": "DC"}, {"id": 11, "name": "Boise", "state": "ID"}]"#,
        )
        .unwrap();

        let cities = CityDirectory::from_path(&path).unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities.in_state("id").count(), 1);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = CityDirectory::from_path(Path::new("/nonexistent/cities.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cities.json"));
    }
}
