// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trailcast: workout routes, places and weather from a health store
//!
//! This crate turns read-only health store workouts into paginated,
//! enriched records (route distance, start address, and on-demand
//! historical weather) and serves them over an HTTP API.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use dashmap::DashMap;
use services::{ExportHealthStore, NominatimGeocoder, OpenMeteoArchive, QueryParams, WorkoutSession};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A session wired to the production collaborators.
pub type LiveSession = WorkoutSession<ExportHealthStore, NominatimGeocoder, OpenMeteoArchive>;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<ExportHealthStore>,
    pub geocoder: Arc<NominatimGeocoder>,
    pub weather: Arc<OpenMeteoArchive>,
    pub sessions: DashMap<u64, Arc<LiveSession>>,
    next_session_id: AtomicU64,
}

impl AppState {
    pub fn new(config: Config, store: ExportHealthStore) -> Self {
        let geocoder = NominatimGeocoder::new(
            config.nominatim_url.clone(),
            config.geocoder_user_agent.clone(),
        );
        let weather = OpenMeteoArchive::new(config.open_meteo_archive_url.clone());

        Self {
            config,
            store: Arc::new(store),
            geocoder: Arc::new(geocoder),
            weather: Arc::new(weather),
            sessions: DashMap::new(),
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Parameters for a session that did not ask for any.
    pub fn default_params(&self) -> QueryParams {
        QueryParams {
            window_days: self.config.default_window_days,
            limit: self.config.default_page_limit,
        }
    }

    /// Create a session (not yet registered or started).
    pub fn new_session(&self, params: QueryParams) -> (u64, Arc<LiveSession>) {
        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let session = WorkoutSession::new(
            Arc::clone(&self.store),
            Arc::clone(&self.geocoder),
            Arc::clone(&self.weather),
            params,
        );
        (id, Arc::new(session))
    }

    pub fn session(&self, id: u64) -> Option<Arc<LiveSession>> {
        self.sessions.get(&id).map(|s| Arc::clone(s.value()))
    }
}
