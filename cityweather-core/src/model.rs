use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Provider weather condition descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Category, e.g. "Rain" or "Clear".
    pub main: String,
    pub description: String,
    /// Provider icon code, e.g. "10d".
    pub icon: String,
}

/// Current conditions as the provider reported them, in imperial units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecast {
    pub location_name: String,
    pub temperature_f: f64,
    pub feels_like_f: f64,
    pub humidity_pct: u8,
    pub wind_speed_mph: f64,
    pub wind_deg: f64,
    /// Unix seconds, UTC.
    pub sunrise: i64,
    /// Unix seconds, UTC.
    pub sunset: i64,
    /// Location offset from UTC in seconds.
    pub timezone_offset_secs: i32,
    pub condition: Condition,
}

/// Display-ready record derived from a [`RawForecast`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedForecast {
    pub location_name: String,
    pub temperature: Temperature,
    pub feels_like: Temperature,
    pub humidity_pct: u8,
    /// Slot in the 9-entry compass table; 0 and 8 are both north.
    pub wind_compass_index: u8,
    pub wind_direction: CompassPoint,
    pub wind_speed_mph: i64,
    pub sunrise: String,
    pub sunset: String,
    pub condition: Condition,
    pub condition_text: String,
    pub color: ColorTag,
    pub icon_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Fahrenheit,
    Celsius,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Celsius => "°C",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
        }
    }

    pub const fn all() -> &'static [TemperatureUnit] {
        &[TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius]
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown temperature unit '{0}'. Supported units: f, c.")]
pub struct UnknownUnit(pub String);

impl FromStr for TemperatureUnit {
    type Err = UnknownUnit;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "f" | "°f" | "fahrenheit" | "imperial" => Ok(TemperatureUnit::Fahrenheit),
            "c" | "°c" | "celsius" | "metric" => Ok(TemperatureUnit::Celsius),
            _ => Err(UnknownUnit(value.to_string())),
        }
    }
}

/// A temperature kept in Fahrenheit, readable in either unit as whole degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    fahrenheit: f64,
}

impl Temperature {
    pub fn from_fahrenheit(fahrenheit: f64) -> Self {
        Self { fahrenheit }
    }

    pub fn fahrenheit(&self) -> i64 {
        self.fahrenheit.round() as i64
    }

    pub fn celsius(&self) -> i64 {
        fahrenheit_to_celsius(self.fahrenheit)
    }

    pub fn in_unit(&self, unit: TemperatureUnit) -> i64 {
        match unit {
            TemperatureUnit::Fahrenheit => self.fahrenheit(),
            TemperatureUnit::Celsius => self.celsius(),
        }
    }
}

/// `round((f - 32) * 5/9)`, halves rounding up.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> i64 {
    round_half_up((fahrenheit - 32.0) * 5.0 / 9.0)
}

pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompassPoint {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CompassPoint {
    /// Compass table lookup. Slot 8 wraps back to north.
    pub fn from_index(index: u8) -> Self {
        match index % 8 {
            0 => CompassPoint::North,
            1 => CompassPoint::NorthEast,
            2 => CompassPoint::East,
            3 => CompassPoint::SouthEast,
            4 => CompassPoint::South,
            5 => CompassPoint::SouthWest,
            6 => CompassPoint::West,
            _ => CompassPoint::NorthWest,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompassPoint::North => "north",
            CompassPoint::NorthEast => "northeast",
            CompassPoint::East => "east",
            CompassPoint::SouthEast => "southeast",
            CompassPoint::South => "south",
            CompassPoint::SouthWest => "southwest",
            CompassPoint::West => "west",
            CompassPoint::NorthWest => "northwest",
        }
    }
}

impl std::fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Semantic severity tag for a weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Info,
    Primary,
    Secondary,
    Warning,
    Dark,
    Light,
}

impl ColorTag {
    pub fn from_condition(condition: &Condition) -> Self {
        if condition.description == "few clouds" {
            return ColorTag::Info;
        }

        match condition.main.as_str() {
            "Clear" => ColorTag::Info,
            "Rain" | "Drizzle" | "Squall" => ColorTag::Primary,
            "Thunderstorm" | "Ash" => ColorTag::Dark,
            "Snow" => ColorTag::Light,
            "Dust" | "Sand" => ColorTag::Warning,
            _ => ColorTag::Secondary,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTag::Info => "info",
            ColorTag::Primary => "primary",
            ColorTag::Secondary => "secondary",
            ColorTag::Warning => "warning",
            ColorTag::Dark => "dark",
            ColorTag::Light => "light",
        }
    }
}

impl std::fmt::Display for ColorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
