// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session API: paginated enriched workouts and on-demand weather.

use crate::error::{AppError, Result};
use crate::models::{
    celsius_to_fahrenheit, kmh_to_mph, Address, CardinalDirection, Coordinate, EnrichedWorkout,
    WeatherSnapshot,
};
use crate::services::{LoadOutcome, QueryParams, SessionPhase, SessionSnapshot};
use crate::time_utils::{format_elapsed, format_utc_rfc3339};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/more", post(load_more))
        .route("/api/sessions/{id}/params", put(update_params))
        .route(
            "/api/sessions/{id}/workouts/{workout_id}/weather",
            get(get_weather),
        )
}

// ─── Views ───────────────────────────────────────────────────

/// A session as seen by the UI.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: u64,
    pub window_days: u32,
    pub limit: u32,
    pub phase: SessionPhase,
    pub cursor: String,
    pub is_loading: bool,
    pub has_more_data: bool,
    pub last_error: Option<String>,
    pub workouts: Vec<WorkoutView>,
}

impl SessionView {
    pub fn build(id: u64, snapshot: SessionSnapshot) -> Self {
        Self {
            id,
            window_days: snapshot.params.window_days,
            limit: snapshot.params.limit,
            phase: snapshot.phase,
            cursor: format_utc_rfc3339(snapshot.cursor),
            is_loading: snapshot.is_loading,
            has_more_data: snapshot.has_more_data,
            last_error: snapshot.last_error,
            workouts: snapshot
                .workouts
                .iter()
                .map(|w| WorkoutView::build(w))
                .collect(),
        }
    }
}

/// One list row / map entry.
#[derive(Debug, Serialize)]
pub struct WorkoutView {
    pub id: String,
    pub activity_type: String,
    pub start_date: String,
    pub end_date: String,
    /// "H:MM:SS" or "M:SS"
    pub elapsed: String,
    pub distance_miles: f64,
    pub address: Option<Address>,
    pub city: String,
    pub coordinates: Vec<Coordinate>,
    /// Route as an encoded polyline (precision 5)
    pub polyline: Option<String>,
    /// Present once a weather lookup for this workout has succeeded
    pub weather: Option<WeatherView>,
}

impl WorkoutView {
    pub fn build(workout: &EnrichedWorkout) -> Self {
        Self {
            id: workout.id().to_string(),
            activity_type: workout.workout.activity_type.to_string(),
            start_date: format_utc_rfc3339(workout.start_date),
            end_date: format_utc_rfc3339(workout.end_date),
            elapsed: format_elapsed(workout.start_date, workout.end_date),
            distance_miles: workout.distance_miles,
            address: workout.address.clone(),
            city: workout.city_name().to_string(),
            coordinates: workout.coordinates.clone(),
            polyline: encode_route(&workout.coordinates),
            weather: workout.weather.get().map(WeatherView::from),
        }
    }
}

fn encode_route(coordinates: &[Coordinate]) -> Option<String> {
    if coordinates.is_empty() {
        return None;
    }
    let line: geo::LineString<f64> = coordinates
        .iter()
        .map(|c| (c.longitude, c.latitude))
        .collect();

    match polyline::encode_coordinates(line, 5) {
        Ok(encoded) => Some(encoded),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode route polyline");
            None
        }
    }
}

/// Weather with both metric and imperial units.
#[derive(Debug, Serialize)]
pub struct WeatherView {
    pub symbol_name: Option<String>,
    pub condition: Option<String>,
    pub min_temp_celsius: Option<f64>,
    pub max_temp_celsius: Option<f64>,
    pub min_temp_fahrenheit: Option<f64>,
    pub max_temp_fahrenheit: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_speed_mph: Option<f64>,
    pub wind_direction_degrees: Option<f64>,
    pub wind_direction: Option<CardinalDirection>,
    pub precipitation: Option<String>,
}

impl From<WeatherSnapshot> for WeatherView {
    fn from(weather: WeatherSnapshot) -> Self {
        Self {
            wind_direction: weather.wind_direction(),
            min_temp_fahrenheit: weather.min_temp_celsius.map(celsius_to_fahrenheit),
            max_temp_fahrenheit: weather.max_temp_celsius.map(celsius_to_fahrenheit),
            wind_speed_mph: weather.wind_speed_kmh.map(kmh_to_mph),
            symbol_name: weather.symbol_name,
            condition: weather.condition,
            min_temp_celsius: weather.min_temp_celsius,
            max_temp_celsius: weather.max_temp_celsius,
            wind_speed_kmh: weather.wind_speed_kmh,
            wind_direction_degrees: weather.wind_direction_degrees,
            precipitation: weather.precipitation,
        }
    }
}

// ─── Sessions ────────────────────────────────────────────────

/// Body for creating a session or changing its parameters.
#[derive(Debug, Default, Deserialize)]
struct ParamsRequest {
    window_days: Option<u32>,
    limit: Option<u32>,
}

impl ParamsRequest {
    fn resolve(&self, defaults: QueryParams) -> Result<QueryParams> {
        QueryParams::new(
            self.window_days.unwrap_or(defaults.window_days),
            self.limit.unwrap_or(defaults.limit),
        )
    }
}

fn find_session(state: &AppState, id: u64) -> Result<Arc<crate::LiveSession>> {
    state
        .session(id)
        .ok_or_else(|| AppError::NotFound(format!("session {}", id)))
}

/// Create a session, authorize, and load its first page.
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ParamsRequest>,
) -> Result<(StatusCode, Json<SessionView>)> {
    let params = body.resolve(state.default_params())?;
    let (id, session) = state.new_session(params);

    let outcome = session.start().await?;
    tracing::info!(session_id = id, ?outcome, "Session started");

    state.sessions.insert(id, Arc::clone(&session));
    Ok((
        StatusCode::CREATED,
        Json(SessionView::build(id, session.snapshot())),
    ))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<SessionView>> {
    let session = find_session(&state, id)?;
    Ok(Json(SessionView::build(id, session.snapshot())))
}

#[derive(Debug, Serialize)]
pub struct LoadMoreResponse {
    pub outcome: LoadOutcome,
    pub session: SessionView,
}

/// Infinite-scroll trigger: load the next older page.
async fn load_more(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<LoadMoreResponse>> {
    let session = find_session(&state, id)?;
    let outcome = session.load_more_workouts().await?;

    Ok(Json(LoadMoreResponse {
        outcome,
        session: SessionView::build(id, session.snapshot()),
    }))
}

/// Change date range or page size: start over from now.
async fn update_params(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<ParamsRequest>,
) -> Result<Json<SessionView>> {
    let session = find_session(&state, id)?;
    let params = body.resolve(session.params())?;

    session.reset(params);
    session.start().await?;
    Ok(Json(SessionView::build(id, session.snapshot())))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode> {
    state
        .sessions
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(format!("session {}", id)))?;
    tracing::info!(session_id = id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ─── Weather ─────────────────────────────────────────────────

async fn get_weather(
    State(state): State<Arc<AppState>>,
    Path((id, workout_id)): Path<(u64, String)>,
) -> Result<Json<WeatherView>> {
    let session = find_session(&state, id)?;
    let weather = session.resolve_weather(&workout_id).await?;
    Ok(Json(WeatherView::from(weather)))
}
