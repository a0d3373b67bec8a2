// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures_util::stream::{self, BoxStream, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use trailcast::config::Config;
use trailcast::error::{AppError, Result};
use trailcast::models::{
    ActivityType, Coordinate, DailyWeather, Placemark, Precipitation, RouteSample, SampleBatch,
    WorkoutRecord, WorkoutRoute,
};
use trailcast::routes::create_router;
use trailcast::services::{
    ExportHealthStore, ExportedRoute, ExportedWorkout, HealthDataKind, HealthStore,
    QueryParams, ReverseGeocoder, WeatherHistoryProvider, WorkoutQuery, WorkoutSession,
};
use trailcast::AppState;

/// A session wired to the mock collaborators.
#[allow(dead_code)]
pub type MockSession = WorkoutSession<MockHealthStore, MockGeocoder, MockWeather>;

// ─── Fixtures ────────────────────────────────────────────────

/// Fixed reference time for cursor-driven tests.
#[allow(dead_code)]
pub fn base_time() -> DateTime<Utc> {
    "2024-06-01T12:00:00Z".parse().unwrap()
}

/// Samples one minute apart along `coords`.
#[allow(dead_code)]
pub fn samples(start: DateTime<Utc>, coords: &[(f64, f64)]) -> Vec<RouteSample> {
    coords
        .iter()
        .enumerate()
        .map(|(i, &(latitude, longitude))| RouteSample {
            latitude,
            longitude,
            timestamp: start + Duration::minutes(i as i64),
        })
        .collect()
}

/// A short loop near Cupertino.
#[allow(dead_code)]
pub const LOOP: [(f64, f64); 4] = [
    (37.3318, -122.0312),
    (37.3330, -122.0300),
    (37.3345, -122.0290),
    (37.3318, -122.0312),
];

pub struct MockRoute {
    pub id: String,
    pub batches: Vec<Vec<RouteSample>>,
}

pub struct MockWorkout {
    pub record: WorkoutRecord,
    pub routes: Vec<MockRoute>,
}

/// A workout of `activity_type` with one single-batch route over `coords`.
#[allow(dead_code)]
pub fn workout(
    id: &str,
    activity_type: ActivityType,
    start: DateTime<Utc>,
    coords: &[(f64, f64)],
) -> MockWorkout {
    MockWorkout {
        record: WorkoutRecord {
            id: id.to_string(),
            activity_type,
            start_date: start,
            end_date: start + Duration::minutes(45),
        },
        routes: vec![MockRoute {
            id: format!("{}-route", id),
            batches: vec![samples(start, coords)],
        }],
    }
}

/// A run on the loop starting `hours` before `base`.
#[allow(dead_code)]
pub fn run(id: &str, base: DateTime<Utc>, hours: i64) -> MockWorkout {
    workout(id, ActivityType::Running, base - Duration::hours(hours), &LOOP)
}

// ─── Health store ────────────────────────────────────────────

/// Scripted health store with failure injection and a query gate.
#[derive(Default)]
pub struct MockHealthStore {
    workouts: Vec<MockWorkout>,
    deny_authorization: bool,
    /// Workouts whose route lookup fails
    failing_routes: HashSet<String>,
    /// Workouts whose sample stream breaks after this many complete reads
    failing_samples: HashMap<String, usize>,
    sample_reads: Mutex<HashMap<String, usize>>,
    fail_queries: AtomicBool,
    query_count: AtomicUsize,
    authorization_requests: AtomicUsize,
    /// When set, each query waits for a permit before returning
    gate: Mutex<Option<Arc<Notify>>>,
}

#[allow(dead_code)]
impl MockHealthStore {
    pub fn new(workouts: Vec<MockWorkout>) -> Self {
        Self {
            workouts,
            ..Self::default()
        }
    }

    pub fn denying_authorization(mut self) -> Self {
        self.deny_authorization = true;
        self
    }

    pub fn with_failing_routes(mut self, workout_ids: &[&str]) -> Self {
        self.failing_routes = workout_ids.iter().map(|id| id.to_string()).collect();
        self
    }

    /// Every sample read for these workouts yields one batch, then an error.
    pub fn with_failing_samples(self, workout_ids: &[&str]) -> Self {
        self.with_samples_failing_after(workout_ids, 0)
    }

    /// The first `reads` sample reads for these workouts succeed; later
    /// ones yield one batch, then an error.
    pub fn with_samples_failing_after(mut self, workout_ids: &[&str], reads: usize) -> Self {
        self.failing_samples
            .extend(workout_ids.iter().map(|id| (id.to_string(), reads)));
        self
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn set_gate(&self, gate: Arc<Notify>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    pub fn queries(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }

    pub fn authorization_requests(&self) -> usize {
        self.authorization_requests.load(Ordering::SeqCst)
    }
}

impl HealthStore for MockHealthStore {
    async fn request_authorization(&self, _kinds: &[HealthDataKind]) -> Result<()> {
        self.authorization_requests.fetch_add(1, Ordering::SeqCst);
        if self.deny_authorization {
            return Err(AppError::HealthAuthorization("denied".to_string()));
        }
        Ok(())
    }

    async fn query_workouts(&self, query: &WorkoutQuery) -> Result<Vec<WorkoutRecord>> {
        self.query_count.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(AppError::HealthQuery("store unavailable".to_string()));
        }

        let mut matching: Vec<WorkoutRecord> = self
            .workouts
            .iter()
            .map(|w| w.record.clone())
            .filter(|w| query.matches(w))
            .collect();
        matching.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        matching.truncate(query.limit);
        Ok(matching)
    }

    async fn workout_routes(&self, workout: &WorkoutRecord) -> Result<Vec<WorkoutRoute>> {
        if self.failing_routes.contains(&workout.id) {
            return Err(AppError::RouteExtraction(format!(
                "route query failed for {}",
                workout.id
            )));
        }

        Ok(self
            .workouts
            .iter()
            .filter(|w| w.record.id == workout.id)
            .flat_map(|w| &w.routes)
            .map(|r| WorkoutRoute {
                id: r.id.clone(),
                workout_id: workout.id.clone(),
            })
            .collect())
    }

    fn route_sample_batches<'a>(
        &'a self,
        route: &'a WorkoutRoute,
    ) -> BoxStream<'a, Result<SampleBatch>> {
        let batches: Vec<Vec<RouteSample>> = self
            .workouts
            .iter()
            .filter(|w| w.record.id == route.workout_id)
            .flat_map(|w| &w.routes)
            .find(|r| r.id == route.id)
            .map(|r| r.batches.clone())
            .unwrap_or_default();

        if let Some(&allowed) = self.failing_samples.get(&route.workout_id) {
            let mut reads = self.sample_reads.lock().unwrap();
            let read = reads.entry(route.workout_id.clone()).or_default();
            *read += 1;
            if *read > allowed {
                let first = batches.into_iter().next().unwrap_or_default();
                let error = AppError::RouteExtraction(format!(
                    "sample stream broke for {}",
                    route.id
                ));
                return stream::iter(vec![
                    Ok(SampleBatch {
                        samples: first,
                        done: false,
                    }),
                    Err(error),
                ])
                .boxed();
            }
        }

        let last = batches.len().saturating_sub(1);
        stream::iter(batches.into_iter().enumerate().map(move |(i, samples)| {
            Ok(SampleBatch {
                samples,
                done: i == last,
            })
        }))
        .boxed()
    }
}

// ─── Geocoder ────────────────────────────────────────────────

#[derive(Default)]
pub struct MockGeocoder {
    pub fail: bool,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockGeocoder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReverseGeocoder for MockGeocoder {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Vec<Placemark>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Geocoding("offline".to_string()));
        }
        Ok(vec![Placemark {
            thoroughfare: Some(format!(
                "{:.4},{:.4}",
                coordinate.latitude, coordinate.longitude
            )),
            locality: Some("Cupertino".to_string()),
            postal_code: Some("95014".to_string()),
            administrative_area: Some("California".to_string()),
            name: None,
        }])
    }
}

// ─── Weather ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockWeather {
    fail: AtomicBool,
    calls: AtomicUsize,
    requests: Mutex<Vec<(NaiveDate, NaiveDate)>>,
    /// When set, each lookup waits for a permit before returning
    gate: Mutex<Option<Arc<Notify>>>,
}

#[allow(dead_code)]
impl MockWeather {
    pub fn failing() -> Self {
        let weather = Self::default();
        weather.set_failing(true);
        weather
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_gate(&self, gate: Arc<Notify>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.requests.lock().unwrap().clone()
    }
}

impl WeatherHistoryProvider for MockWeather {
    async fn daily_history(
        &self,
        _coordinate: Coordinate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyWeather>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((start, end));

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Weather("offline".to_string()));
        }
        Ok(vec![DailyWeather {
            date: start,
            symbol_name: Some("sun.max".to_string()),
            condition: Some("Clear".to_string()),
            min_temp_celsius: Some(10.0),
            max_temp_celsius: Some(20.0),
            wind_speed_kmh: Some(12.0),
            wind_direction_degrees: Some(315.0),
            precipitation: Some(Precipitation::None),
        }])
    }
}

/// Build a session over mock collaborators, returning the collaborators
/// for inspection.
#[allow(dead_code)]
pub fn mock_session(
    store: MockHealthStore,
    geocoder: MockGeocoder,
    weather: MockWeather,
    params: QueryParams,
) -> (
    Arc<MockSession>,
    Arc<MockHealthStore>,
    Arc<MockGeocoder>,
    Arc<MockWeather>,
) {
    let store = Arc::new(store);
    let geocoder = Arc::new(geocoder);
    let weather = Arc::new(weather);
    let session = Arc::new(WorkoutSession::new(
        Arc::clone(&store),
        Arc::clone(&geocoder),
        Arc::clone(&weather),
        params,
    ));
    (session, store, geocoder, weather)
}

// ─── HTTP app ────────────────────────────────────────────────

/// Three workouts from the last few days, one of them a swim.
#[allow(dead_code)]
pub fn recent_export() -> ExportHealthStore {
    let now = Utc::now();
    let exported = |id: &str, activity_type: ActivityType, hours: i64| {
        let start = now - Duration::hours(hours);
        ExportedWorkout {
            id: id.to_string(),
            activity_type,
            start_date: start,
            end_date: start + Duration::minutes(50),
            routes: vec![ExportedRoute {
                id: format!("{}-route", id),
                batches: vec![samples(start, &LOOP[..2]), samples(start, &LOOP[2..])],
            }],
        }
    };

    ExportHealthStore::from_workouts(vec![
        exported("walk-1", ActivityType::Walking, 30),
        exported("swim-1", ActivityType::Other("swimming".to_string()), 20),
        exported("ride-1", ActivityType::Cycling, 10),
    ])
}

/// Create a test app over `store`. The geocoder and weather archive point
/// at an address nothing listens on.
#[allow(dead_code)]
pub fn create_test_app_with(store: ExportHealthStore) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default(), store));
    (create_router(state.clone()), state)
}

/// Create a test app with a small recent export.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(recent_export())
}
