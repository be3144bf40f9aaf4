use cityweather_core::{City, NormalizedForecast, TemperatureUnit, normalize::location_label};
use serde::Serialize;

/// Plain-text weather card, shown in the selected unit.
pub fn forecast_card(city: &City, forecast: &NormalizedForecast, unit: TemperatureUnit) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{}{}  [{}]\n",
        forecast.temperature.in_unit(unit),
        unit.symbol(),
        forecast.color,
    ));
    out.push_str(&format!(
        "Feels like {}°, with {}\n",
        forecast.feels_like.in_unit(unit),
        forecast.condition_text,
    ));
    out.push_str("Details:\n");
    out.push_str(&format!("  Humidity: {}%\n", forecast.humidity_pct));
    out.push_str(&format!("  Sunrise: {}\n", forecast.sunrise));
    out.push_str(&format!("  Sunset: {}\n", forecast.sunset));
    out.push_str(&format!(
        "  Wind blowing {} at {}mph\n",
        forecast.wind_direction, forecast.wind_speed_mph,
    ));
    out.push_str(&format!("Icon: {}\n", forecast.icon_url));
    out.push_str(&location_label(&forecast.location_name, city));

    out
}

#[derive(Debug, Serialize)]
struct ForecastView<'a> {
    city: &'a City,
    location: String,
    unit: TemperatureUnit,
    temperature: i64,
    feels_like: i64,
    forecast: &'a NormalizedForecast,
}

pub fn forecast_json(
    city: &City,
    forecast: &NormalizedForecast,
    unit: TemperatureUnit,
) -> serde_json::Result<String> {
    let view = ForecastView {
        city,
        location: location_label(&forecast.location_name, city),
        unit,
        temperature: forecast.temperature.in_unit(unit),
        feels_like: forecast.feels_like.in_unit(unit),
        forecast,
    };

    serde_json::to_string_pretty(&view)
}
