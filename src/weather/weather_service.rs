use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const OPENWEATHER_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("unexpected weather payload: {0}")]
    Format(String),
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Format(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    name: String,
    sys: OwmSys,
    main: OwmMain,
    weather: Vec<OwmConditions>,
    wind: OwmWind,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: i64,
    pressure: i64,
}

#[derive(Debug, Deserialize)]
struct OwmConditions {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub country: String,
    pub temperature: i64,
    pub description: String,
    pub humidity: i64,
    #[serde(rename = "windSpeed")]
    pub wind_speed: i64,
    pub pressure: i64,
    pub icon: String,
}

#[derive(Clone)]
pub struct WeatherService {
    http_client: HttpClient,
    api_key: String,
}

impl WeatherService {
    pub fn new(api_key: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
        }
    }

    /// Current weather for a city, reshaped for the frontend. Transport and
    /// status failures map to `Fetch`; anything wrong with the payload shape
    /// maps to `Format`.
    pub async fn current(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let response = self
            .http_client
            .get(OPENWEATHER_URL)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let payload = response.text().await?;
        let raw: OwmResponse = serde_json::from_str(&payload)?;
        reshape(raw)
    }
}

fn reshape(raw: OwmResponse) -> Result<WeatherReport, WeatherError> {
    let conditions = raw
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Format("no conditions entry in payload".into()))?;

    Ok(WeatherReport {
        city: raw.name,
        country: raw.sys.country,
        temperature: raw.main.temp.round() as i64,
        description: title_case(&conditions.description),
        humidity: raw.main.humidity,
        wind_speed: (raw.wind.speed * 3.6).round() as i64,
        pressure: raw.main.pressure,
        icon: conditions.icon,
    })
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
