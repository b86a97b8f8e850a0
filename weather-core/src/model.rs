use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single entry returned by the location search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    #[serde(default)]
    pub url: Option<String>,
}

impl LocationCandidate {
    /// Candidate that carries only a name, e.g. a city typed on the command line.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            region: String::new(),
            country: String::new(),
            lat: 0.0,
            lon: 0.0,
            url: None,
        }
    }
}

impl fmt::Display for LocationCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.country.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}, {}", self.name, self.country)
        }
    }
}

/// Body of a successful forecast call.
///
/// Replaced wholesale on every successful fetch, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    pub location: Place,
    pub current: Current,
    pub forecast: Forecast,
}

impl WeatherPayload {
    /// Sunrise of the first forecast day, which the API reports as "today".
    pub fn today_sunrise(&self) -> Option<&str> {
        self.forecast
            .forecastday
            .first()
            .map(|day| day.astro.sunrise.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub temp_c: f64,
    pub condition: Condition,
    pub wind_kph: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day: DaySummary,
    pub astro: Astro,
}

impl ForecastDay {
    /// Full English weekday name, e.g. "Monday".
    pub fn day_name(&self) -> String {
        self.date.format("%A").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub avgtemp_c: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Astro {
    pub sunrise: String,
}
