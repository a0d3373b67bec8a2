// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health store backed by a JSON health data export.
//!
//! The export is loaded once and only ever read. Route samples are replayed
//! in the batches they were recorded in, so consumers see the same
//! incremental delivery a live store produces.

use crate::error::{AppError, Result};
use crate::models::{ActivityType, RouteSample, SampleBatch, WorkoutRecord, WorkoutRoute};
use crate::services::health_store::{HealthDataKind, HealthStore, WorkoutQuery};
use chrono::{DateTime, Utc};
use futures_util::stream::{self, BoxStream, StreamExt};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Top-level layout of an export file.
#[derive(Debug, Deserialize)]
struct ExportFile {
    #[serde(default = "default_authorized")]
    authorized: bool,
    #[serde(default)]
    workouts: Vec<ExportedWorkout>,
}

fn default_authorized() -> bool {
    true
}

/// A workout as stored in the export.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportedWorkout {
    pub id: String,
    pub activity_type: ActivityType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub routes: Vec<ExportedRoute>,
}

/// A route as stored in the export: samples grouped by delivery batch.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportedRoute {
    pub id: String,
    #[serde(default)]
    pub batches: Vec<Vec<RouteSample>>,
}

impl ExportedWorkout {
    fn record(&self) -> WorkoutRecord {
        WorkoutRecord {
            id: self.id.clone(),
            activity_type: self.activity_type.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Read-only health store over exported workouts.
#[derive(Debug, Default)]
pub struct ExportHealthStore {
    /// Whether the export grants read access at all
    access_allowed: bool,
    /// Set once `request_authorization` has succeeded
    granted: AtomicBool,
    workouts: Vec<ExportedWorkout>,
}

impl ExportHealthStore {
    /// Load an export from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ExportError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| ExportError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load an export from a JSON string.
    pub fn load_from_json(json_data: &str) -> std::result::Result<Self, ExportError> {
        let file: ExportFile =
            serde_json::from_str(json_data).map_err(|e| ExportError::ParseError(e.to_string()))?;

        for workout in &file.workouts {
            if workout.end_date < workout.start_date {
                return Err(ExportError::InvalidWorkout(format!(
                    "workout {} ends before it starts",
                    workout.id
                )));
            }
        }

        tracing::info!(
            count = file.workouts.len(),
            authorized = file.authorized,
            "Loaded health export"
        );

        Ok(Self {
            access_allowed: file.authorized,
            granted: AtomicBool::new(false),
            workouts: file.workouts,
        })
    }

    /// Build a store directly from workouts (access allowed).
    pub fn from_workouts(workouts: Vec<ExportedWorkout>) -> Self {
        Self {
            access_allowed: true,
            granted: AtomicBool::new(false),
            workouts,
        }
    }

    pub fn workout_count(&self) -> usize {
        self.workouts.len()
    }

    fn ensure_granted(&self) -> Result<()> {
        if self.granted.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(AppError::HealthAuthorization(
                "read access has not been granted".to_string(),
            ))
        }
    }

    fn find_route(&self, route: &WorkoutRoute) -> Option<&ExportedRoute> {
        self.workouts
            .iter()
            .find(|w| w.id == route.workout_id)
            .and_then(|w| w.routes.iter().find(|r| r.id == route.id))
    }
}

impl HealthStore for ExportHealthStore {
    async fn request_authorization(&self, kinds: &[HealthDataKind]) -> Result<()> {
        if !self.access_allowed {
            tracing::warn!(?kinds, "Health data access denied by export");
            return Err(AppError::HealthAuthorization(
                "access to workouts and routes was denied".to_string(),
            ));
        }
        self.granted.store(true, Ordering::Release);
        tracing::debug!(?kinds, "Health data access granted");
        Ok(())
    }

    async fn query_workouts(&self, query: &WorkoutQuery) -> Result<Vec<WorkoutRecord>> {
        self.ensure_granted()?;

        let mut matching: Vec<WorkoutRecord> = self
            .workouts
            .iter()
            .map(ExportedWorkout::record)
            .filter(|w| query.matches(w))
            .collect();

        // Stable sort: ties keep export order.
        matching.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        matching.truncate(query.limit);
        Ok(matching)
    }

    async fn workout_routes(&self, workout: &WorkoutRecord) -> Result<Vec<WorkoutRoute>> {
        self.ensure_granted()?;

        Ok(self
            .workouts
            .iter()
            .find(|w| w.id == workout.id)
            .map(|w| {
                w.routes
                    .iter()
                    .map(|r| WorkoutRoute {
                        id: r.id.clone(),
                        workout_id: w.id.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn route_sample_batches<'a>(
        &'a self,
        route: &'a WorkoutRoute,
    ) -> BoxStream<'a, Result<SampleBatch>> {
        if let Err(e) = self.ensure_granted() {
            return stream::once(async move { Err(e) }).boxed();
        }

        let Some(exported) = self.find_route(route) else {
            let err = AppError::RouteExtraction(format!("unknown route {}", route.id));
            return stream::once(async move { Err(err) }).boxed();
        };

        if exported.batches.is_empty() {
            return stream::once(async {
                Ok(SampleBatch {
                    samples: Vec::new(),
                    done: true,
                })
            })
            .boxed();
        }

        let last = exported.batches.len() - 1;
        stream::iter(exported.batches.iter().enumerate().map(move |(i, batch)| {
            Ok(SampleBatch {
                samples: batch.clone(),
                done: i == last,
            })
        }))
        .boxed()
    }
}

/// Errors from loading an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse health export: {0}")]
    ParseError(String),

    #[error("Invalid workout in export: {0}")]
    InvalidWorkout(String),
}
