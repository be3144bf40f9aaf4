use chrono::{DateTime, FixedOffset};

use crate::{
    city::City,
    model::{ColorTag, CompassPoint, NormalizedForecast, RawForecast, Temperature, round_half_up},
};

const ICON_BASE_URL: &str = "http://openweathermap.org/img/wn";

/// Turn a provider payload into a display-ready record.
///
/// `viewer_offset` is the offset of the clock the result will be read
/// against; sun times are shifted by `timezone - viewer_offset`.
pub fn normalize(raw: &RawForecast, viewer_offset: FixedOffset) -> NormalizedForecast {
    let wind_compass_index = compass_index(raw.wind_deg);

    NormalizedForecast {
        location_name: raw.location_name.clone(),
        temperature: Temperature::from_fahrenheit(raw.temperature_f),
        feels_like: Temperature::from_fahrenheit(raw.feels_like_f),
        humidity_pct: raw.humidity_pct,
        wind_compass_index,
        wind_direction: CompassPoint::from_index(wind_compass_index),
        wind_speed_mph: round_half_up(raw.wind_speed_mph),
        sunrise: local_clock_time(raw.sunrise, raw.timezone_offset_secs, viewer_offset),
        sunset: local_clock_time(raw.sunset, raw.timezone_offset_secs, viewer_offset),
        condition: raw.condition.clone(),
        condition_text: condition_text(&raw.condition.description),
        color: ColorTag::from_condition(&raw.condition),
        icon_url: icon_url(&raw.condition.icon),
    }
}

/// `round(deg / 45) mod 9`.
pub fn compass_index(deg: f64) -> u8 {
    round_half_up(deg / 45.0).rem_euclid(9) as u8
}

/// Short time of day, e.g. "6:42 AM", for a Unix timestamp.
pub fn local_clock_time(unix_secs: i64, provider_offset_secs: i32, viewer_offset: FixedOffset) -> String {
    let shift = i64::from(provider_offset_secs) - i64::from(viewer_offset.local_minus_utc());

    match unix_secs
        .checked_add(shift)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
    {
        Some(instant) => instant
            .with_timezone(&viewer_offset)
            .format("%-I:%M %p")
            .to_string(),
        None => "--:--".to_string(),
    }
}

pub fn condition_text(description: &str) -> String {
    if description.contains("clear") {
        "clear skies".to_string()
    } else {
        description.to_string()
    }
}

pub fn icon_url(icon: &str) -> String {
    format!("{ICON_BASE_URL}/{icon}@4x.png")
}

/// Provider location name, suffixed with the state except for DC.
pub fn location_label(location_name: &str, city: &City) -> String {
    if city.is_dc() {
        location_name.to_string()
    } else {
        format!("{location_name}, {}", city.state)
    }
}
