// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout queries restricted to workouts that can be drawn on a map.

use crate::error::Result;
use crate::models::{ActivityType, DateWindow, WorkoutRecord};
use crate::services::health_store::{HealthStore, WorkoutQuery};
use crate::services::route_extractor::RouteSampleExtractor;
use std::sync::Arc;

/// Fetches workouts from the health store and keeps only mappable ones.
pub struct WorkoutQueryService<H> {
    store: Arc<H>,
    extractor: RouteSampleExtractor<H>,
}

impl<H> Clone for WorkoutQueryService<H> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            extractor: self.extractor.clone(),
        }
    }
}

impl<H: HealthStore> WorkoutQueryService<H> {
    pub fn new(store: Arc<H>) -> Self {
        Self {
            extractor: RouteSampleExtractor::new(Arc::clone(&store)),
            store,
        }
    }

    /// Workouts starting inside `window` with one of `activity_types`,
    /// newest first, that have at least one valid route sample.
    ///
    /// A failed store query aborts with an error. A workout whose routes
    /// cannot be read is only dropped.
    pub async fn fetch_workouts(
        &self,
        window: DateWindow,
        activity_types: &[ActivityType],
        limit: usize,
    ) -> Result<Vec<WorkoutRecord>> {
        let query = WorkoutQuery {
            window,
            activity_types: activity_types.to_vec(),
            limit,
        };

        let workouts = self.store.query_workouts(&query).await?;
        let queried = workouts.len();

        let mut mappable = Vec::with_capacity(queried);
        for workout in workouts {
            if self.has_valid_route(&workout).await {
                mappable.push(workout);
            }
        }

        tracing::debug!(
            window_start = %window.start,
            window_end = %window.end,
            queried,
            mappable = mappable.len(),
            "Fetched workouts"
        );

        Ok(mappable)
    }

    /// True if any route of `workout` has a valid sample.
    pub async fn has_valid_route(&self, workout: &WorkoutRecord) -> bool {
        match self.extractor.authoritative_route(workout).await {
            Ok(route) => route.is_some(),
            Err(e) => {
                tracing::warn!(workout_id = %workout.id, error = %e, "Dropping workout: route extraction failed");
                false
            }
        }
    }
}
