// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only interface to a platform health data store.

use crate::error::Result;
use crate::models::{ActivityType, DateWindow, SampleBatch, WorkoutRecord, WorkoutRoute};
use futures_util::stream::BoxStream;
use std::future::Future;

/// Categories of health data a session needs read access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthDataKind {
    Workouts,
    WorkoutRoutes,
}

impl HealthDataKind {
    /// Everything the workout pipeline reads.
    pub const PIPELINE: [HealthDataKind; 2] =
        [HealthDataKind::Workouts, HealthDataKind::WorkoutRoutes];
}

/// Workout query: start date inside `window` AND activity type in `activity_types`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutQuery {
    pub window: DateWindow,
    pub activity_types: Vec<ActivityType>,
    /// Maximum number of workouts to return
    pub limit: usize,
}

impl WorkoutQuery {
    pub fn matches(&self, workout: &WorkoutRecord) -> bool {
        self.window.contains(workout.start_date)
            && self.activity_types.contains(&workout.activity_type)
    }
}

/// A platform health store. Implementations never mutate health data.
pub trait HealthStore: Send + Sync + 'static {
    /// Ask for read access to `kinds`. Must succeed before any query.
    fn request_authorization(
        &self,
        kinds: &[HealthDataKind],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Workouts matching `query`, newest first, at most `query.limit`.
    fn query_workouts(
        &self,
        query: &WorkoutQuery,
    ) -> impl Future<Output = Result<Vec<WorkoutRecord>>> + Send;

    /// Routes recorded for a workout, possibly none.
    fn workout_routes(
        &self,
        workout: &WorkoutRecord,
    ) -> impl Future<Output = Result<Vec<WorkoutRoute>>> + Send;

    /// Samples of a route, delivered incrementally. The last batch has
    /// `done` set; the stream may also simply end.
    fn route_sample_batches<'a>(
        &'a self,
        route: &'a WorkoutRoute,
    ) -> BoxStream<'a, Result<SampleBatch>>;
}
