use chrono::NaiveDate;
use std::fmt::Write;
use weather_core::{ForecastDay, LocationCandidate, ScreenState, WeatherPayload};

/// Whole screen: search box state, candidates, then the weather panel.
pub fn screen(state: &ScreenState, today: NaiveDate) -> String {
    if state.loading {
        return "Loading...\n".to_string();
    }

    let mut out = String::new();
    if state.show_search {
        out.push_str("[search] type a city, `/` to close\n");
        if !state.candidates.is_empty() {
            out.push_str(&candidates(&state.candidates));
        }
        out.push('\n');
    }

    match &state.weather {
        Some(payload) => out.push_str(&weather(payload, today)),
        None => out.push_str("No weather data.\n"),
    }
    out
}

pub fn candidates(list: &[LocationCandidate]) -> String {
    let mut out = String::new();
    for (idx, candidate) in list.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}) {}", idx + 1, candidate);
    }
    out
}

pub fn weather(payload: &WeatherPayload, today: NaiveDate) -> String {
    let mut out = String::new();
    let place = &payload.location;
    let current = &payload.current;

    if place.country.is_empty() {
        let _ = writeln!(out, "{}", place.name);
    } else {
        let _ = writeln!(out, "{}, {}", place.name, place.country);
    }
    let _ = writeln!(out, "{}°  {}", current.temp_c, current.condition.text);
    let _ = writeln!(
        out,
        "wind {}km  humidity {}%  sunrise {}",
        current.wind_kph,
        current.humidity,
        payload.today_sunrise().unwrap_or("-"),
    );

    if !payload.forecast.forecastday.is_empty() {
        out.push_str("\nDaily Forecast\n");
        for day in &payload.forecast.forecastday {
            let _ = writeln!(
                out,
                "  {:<10} {:>6}°  {}",
                day_label(day, today),
                day.day.avgtemp_c,
                day.day.condition.text
            );
        }
    }
    out
}

fn day_label(day: &ForecastDay, today: NaiveDate) -> String {
    if day.date == today { "Today".to_string() } else { day.day_name() }
}
