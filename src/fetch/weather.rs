// weather.rs - Weather Fetcher
// Current conditions for a city from the OpenWeatherMap API, metric units.

use super::{FetchError, FetchResult};
use log::debug;
use serde::Deserialize;
use serde_json::Value;

/// Only `cod` is read first; error bodies carry it as a string.
#[derive(Deserialize)]
struct WeatherStatus {
    cod: Value,
    #[serde(default)]
    message: Value,
}

#[derive(Deserialize)]
struct WeatherResponse {
    main: MainReadings,
    weather: Vec<Condition>,
}

#[derive(Deserialize)]
struct MainReadings {
    temp: f64,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

pub async fn fetch(client: &reqwest::Client, url: &str, api_key: &str, city: &str) -> FetchResult {
    debug!("🌦️ Fetching weather for '{}'", city);

    // The provider reports "city not found" in the body, so the HTTP status is not checked here
    let body = client
        .get(url)
        .query(&[("q", city), ("appid", api_key), ("units", "metric")])
        .send()
        .await?
        .text()
        .await?;

    format_weather(city, &body)
}

/// Decode a weather body and format "Weather in {city}: {description}, {temp:.2}°C".
pub fn format_weather(city: &str, body: &str) -> FetchResult {
    let status: WeatherStatus = serde_json::from_str(body)?;
    if status.cod.as_f64() != Some(200.0) {
        return Err(FetchError::NotFound(
            status
                .message
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("cod {}", status.cod)),
        ));
    }

    let report: WeatherResponse = serde_json::from_str(body)?;
    let condition = report
        .weather
        .first()
        .ok_or(FetchError::MissingField("weather[0].description"))?;

    Ok(format!(
        "Weather in {}: {}, {:.2}°C",
        city, condition.description, report.main.temp
    ))
}
