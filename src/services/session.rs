// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pagination session over the workout pipeline.
//!
//! A session owns one query context: its parameters, the cursor, and the
//! workouts loaded so far. Each parameter change starts a new generation;
//! results from a load started under an older generation are dropped.

use crate::config::{MAX_PAGE_LIMIT, MAX_WINDOW_DAYS};
use crate::error::{AppError, Result};
use crate::models::{EnrichedWorkout, WeatherSnapshot};
use crate::services::geocoder::ReverseGeocoder;
use crate::services::health_store::{HealthDataKind, HealthStore};
use crate::services::pipeline::{next_cursor, WorkoutAggregationPipeline};
use crate::services::weather::{WeatherHistoryProvider, WeatherHistoryResolver};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Date range and page size for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    pub window_days: u32,
    pub limit: u32,
}

impl QueryParams {
    pub fn new(window_days: u32, limit: u32) -> Result<Self> {
        if !(1..=MAX_WINDOW_DAYS).contains(&window_days) {
            return Err(AppError::BadRequest(format!(
                "window_days must be between 1 and {}",
                MAX_WINDOW_DAYS
            )));
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        Ok(Self { window_days, limit })
    }
}

/// Where the session is in its page cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Loading { cursor: DateTime<Utc> },
    PageReady { count: usize, cursor: DateTime<Utc> },
    /// No older workouts for these parameters
    Exhausted,
    Failed { error: String },
}

/// What a call to `load_more_workouts` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// A page was appended
    Loaded { count: usize },
    /// Another load for the same parameters is in flight
    AlreadyLoading,
    /// Nothing left to load
    Exhausted,
    /// Parameters changed while loading; results were discarded
    Stale,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub params: QueryParams,
    pub generation: u64,
    pub phase: SessionPhase,
    pub cursor: DateTime<Utc>,
    pub is_loading: bool,
    pub has_more_data: bool,
    pub workouts: Vec<Arc<EnrichedWorkout>>,
    pub last_error: Option<String>,
}

struct SessionState {
    params: QueryParams,
    generation: u64,
    cursor: DateTime<Utc>,
    phase: SessionPhase,
    workouts: Vec<Arc<EnrichedWorkout>>,
    has_more_data: bool,
    /// Generation of the load in flight, if any
    loading_generation: Option<u64>,
    authorized: bool,
    last_error: Option<String>,
}

impl SessionState {
    fn fresh(params: QueryParams, generation: u64, authorized: bool) -> Self {
        Self {
            params,
            generation,
            cursor: Utc::now(),
            phase: SessionPhase::Idle,
            workouts: Vec::new(),
            has_more_data: true,
            loading_generation: None,
            authorized,
            last_error: None,
        }
    }

    fn fail(&mut self, error: &AppError) {
        self.phase = SessionPhase::Failed {
            error: error.to_string(),
        };
        self.has_more_data = false;
        self.last_error = Some(error.to_string());
    }
}

/// One query context: pipeline, weather resolver, and pagination state.
pub struct WorkoutSession<H, G, W> {
    store: Arc<H>,
    pipeline: WorkoutAggregationPipeline<H, G>,
    weather: WeatherHistoryResolver<W>,
    state: Mutex<SessionState>,
}

impl<H, G, W> WorkoutSession<H, G, W>
where
    H: HealthStore,
    G: ReverseGeocoder,
    W: WeatherHistoryProvider,
{
    pub fn new(store: Arc<H>, geocoder: Arc<G>, weather: Arc<W>, params: QueryParams) -> Self {
        Self {
            pipeline: WorkoutAggregationPipeline::new(Arc::clone(&store), geocoder),
            store,
            weather: WeatherHistoryResolver::new(weather),
            state: Mutex::new(SessionState::fresh(params, 0, false)),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Request health data access (once) and load the first page.
    pub async fn start(&self) -> Result<LoadOutcome> {
        self.ensure_authorized().await?;
        self.load_more_workouts().await
    }

    async fn ensure_authorized(&self) -> Result<()> {
        if self.state().authorized {
            return Ok(());
        }

        match self
            .store
            .request_authorization(&HealthDataKind::PIPELINE)
            .await
        {
            Ok(()) => {
                self.state().authorized = true;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Health data authorization failed");
                self.state().fail(&e);
                Err(e)
            }
        }
    }

    /// Load the next older page and append it.
    ///
    /// Does nothing while a load for the current parameters is in flight
    /// or after the session is exhausted.
    pub async fn load_more_workouts(&self) -> Result<LoadOutcome> {
        let (generation, cursor, params) = {
            let mut state = self.state();
            if !state.has_more_data {
                return Ok(LoadOutcome::Exhausted);
            }
            if state.loading_generation == Some(state.generation) {
                tracing::debug!(generation = state.generation, "Load already in flight");
                return Ok(LoadOutcome::AlreadyLoading);
            }
            state.loading_generation = Some(state.generation);
            state.phase = SessionPhase::Loading {
                cursor: state.cursor,
            };
            (state.generation, state.cursor, state.params)
        };

        let result = self
            .pipeline
            .load_page(cursor, params.window_days, params.limit as usize)
            .await;

        let mut state = self.state();
        if state.generation != generation {
            tracing::debug!(
                generation,
                current = state.generation,
                "Discarding results of superseded load"
            );
            return Ok(LoadOutcome::Stale);
        }
        state.loading_generation = None;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(error = %e, %cursor, "Workout page load failed");
                state.fail(&e);
                return Err(e);
            }
        };

        let Some(new_cursor) = next_cursor(&page) else {
            tracing::info!(%cursor, "No more workouts");
            state.phase = SessionPhase::Exhausted;
            state.has_more_data = false;
            return Ok(LoadOutcome::Exhausted);
        };

        let count = page.len();
        state.cursor = new_cursor;
        state.workouts.extend(page.into_iter().map(Arc::new));
        state.phase = SessionPhase::PageReady {
            count,
            cursor: new_cursor,
        };
        Ok(LoadOutcome::Loaded { count })
    }

    /// Switch to new parameters: drop loaded workouts and rewind the
    /// cursor to now. An in-flight load becomes stale.
    pub fn reset(&self, params: QueryParams) {
        let mut state = self.state();
        let generation = state.generation + 1;
        let authorized = state.authorized;
        *state = SessionState::fresh(params, generation, authorized);
        tracing::info!(
            generation,
            window_days = params.window_days,
            limit = params.limit,
            "Session reset"
        );
    }

    /// Weather for a loaded workout. The first successful lookup is cached;
    /// after a provider failure the next request tries again.
    pub async fn resolve_weather(&self, workout_id: &str) -> Result<WeatherSnapshot> {
        let workout = self
            .workout(workout_id)
            .ok_or_else(|| AppError::NotFound(format!("workout {}", workout_id)))?;

        if let Some(snapshot) = workout.weather.get() {
            return Ok(snapshot);
        }

        // A lookup already running for this workout fills the holder first
        let _fetch = workout.weather.lock_fetch().await;
        if let Some(snapshot) = workout.weather.get() {
            return Ok(snapshot);
        }

        let Some(coordinate) = workout.first_coordinate() else {
            workout.weather.set(WeatherSnapshot::empty());
            return Ok(WeatherSnapshot::empty());
        };

        Ok(self
            .weather
            .resolve_into(
                coordinate,
                workout.start_date,
                workout.end_date,
                &workout.weather,
            )
            .await)
    }

    pub fn workout(&self, workout_id: &str) -> Option<Arc<EnrichedWorkout>> {
        self.state()
            .workouts
            .iter()
            .find(|w| w.id() == workout_id)
            .cloned()
    }

    pub fn params(&self) -> QueryParams {
        self.state().params
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot {
            params: state.params,
            generation: state.generation,
            phase: state.phase.clone(),
            cursor: state.cursor,
            is_loading: state.loading_generation == Some(state.generation),
            has_more_data: state.has_more_data,
            workouts: state.workouts.clone(),
            last_error: state.last_error.clone(),
        }
    }
}
