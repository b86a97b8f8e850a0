//! State and behavior behind the weather screen.
//!
//! [`SearchAndDisplayController`] owns four pieces of UI state (search box
//! visibility, candidate list, current weather, loading flag) and publishes
//! every change through a [`tokio::sync::watch`] channel for whatever renders
//! them.
//!
//! Operations take `&self` and may overlap freely. Nothing orders concurrent
//! fetches: each result is applied when it arrives, so the response that
//! resolves last wins regardless of which request went out first.
//!
//! A failed fetch is never an error at this level. It only means the state is
//! not updated this round; the loading flag is still cleared and nothing is
//! retried.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    client::WeatherSource,
    debounce::{Debouncer, SEARCH_DEBOUNCE},
    model::{LocationCandidate, WeatherPayload},
    storage::{CITY_KEY, KeyValueStore},
};

/// City shown when nothing was persisted by a previous session.
pub const FALLBACK_CITY: &str = "Tbilisi";

/// Queries this short (in chars) never reach the location endpoint.
pub const MIN_QUERY_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenState {
    pub show_search: bool,
    pub candidates: Vec<LocationCandidate>,
    pub weather: Option<WeatherPayload>,
    pub loading: bool,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self { show_search: false, candidates: Vec::new(), weather: None, loading: true }
    }
}

/// Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct SearchAndDisplayController {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    source: Arc<dyn WeatherSource>,
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<ScreenState>,
    search_debounce: Debouncer,
    mounted: AtomicBool,
}

impl SearchAndDisplayController {
    pub fn new(source: Arc<dyn WeatherSource>, store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(ScreenState::default());
        Self {
            inner: Arc::new(Inner {
                source,
                store,
                state,
                search_debounce: Debouncer::new(SEARCH_DEBOUNCE),
                mounted: AtomicBool::new(false),
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ScreenState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenState> {
        self.inner.state.subscribe()
    }

    /// Load the forecast for the persisted city, or [`FALLBACK_CITY`].
    ///
    /// Only the first call per controller does anything.
    pub async fn mount(&self) {
        if self.inner.mounted.swap(true, Ordering::SeqCst) {
            debug!("controller already mounted");
            return;
        }

        let city = self
            .inner
            .store
            .get_data(CITY_KEY)
            .await
            .filter(|city| !city.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_CITY.to_string());

        info!(city = %city, "loading initial forecast");
        let result = self.inner.source.fetch_forecast(&city).await;

        self.inner.state.send_modify(|state| {
            if let Ok(payload) = result {
                state.weather = Some(payload);
            }
            state.loading = false;
        });
    }

    /// Debounced entry point for search box edits.
    pub fn on_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        let this = self.clone();
        self.inner.search_debounce.call(async move {
            this.handle_search(&text).await;
        });
    }

    /// Resolve `query` into location candidates, replacing the list on success.
    ///
    /// Queries of two chars or fewer are ignored and leave the list as is.
    pub async fn handle_search(&self, query: &str) {
        if query.chars().count() < MIN_QUERY_CHARS {
            debug!(query, "query too short, skipping search");
            return;
        }

        if let Ok(candidates) = self.inner.source.fetch_location(query).await {
            debug!(query, count = candidates.len(), "search results received");
            self.inner.state.send_modify(|state| state.candidates = candidates);
        }
    }

    /// Switch the screen to `candidate` and remember it for the next launch.
    pub async fn select_location(&self, candidate: &LocationCandidate) {
        self.inner.state.send_modify(|state| {
            state.show_search = false;
            state.candidates.clear();
            state.loading = true;
        });

        info!(city = %candidate.name, "loading forecast for selected location");
        let result = self.inner.source.fetch_forecast(&candidate.name).await;

        match result {
            Ok(payload) => {
                self.inner.state.send_modify(|state| {
                    state.weather = Some(payload);
                    state.loading = false;
                });
                self.inner.store.store_data(CITY_KEY, &candidate.name).await;
            }
            Err(_) => {
                self.inner.state.send_modify(|state| state.loading = false);
            }
        }
    }

    /// Select the candidate at `index` in the current list.
    ///
    /// Returns `false` when there is no such candidate.
    pub async fn select_candidate(&self, index: usize) -> bool {
        let candidate = self.inner.state.borrow().candidates.get(index).cloned();
        match candidate {
            Some(candidate) => {
                self.select_location(&candidate).await;
                true
            }
            None => false,
        }
    }

    pub fn toggle_search(&self) {
        self.inner.state.send_modify(|state| state.show_search = !state.show_search);
    }
}
