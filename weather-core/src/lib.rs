//! Core library for the `weather` screen.
//!
//! This crate defines:
//! - Configuration & API key resolution
//! - The WeatherAPI.com client (forecast and location search)
//! - Key-value persistence for the last viewed city
//! - The debounced search-and-display controller that ties them together
//!
//! It is used by `weather-cli`, but can also be driven by any other front end
//! that renders [`ScreenState`].

pub mod client;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod model;
pub mod storage;

pub use client::{FetchError, WeatherApiClient, WeatherSource};
pub use config::Config;
pub use controller::{FALLBACK_CITY, ScreenState, SearchAndDisplayController};
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use model::{ForecastDay, LocationCandidate, WeatherPayload};
pub use storage::{CITY_KEY, FileStore, KeyValueStore, MemoryStore};
