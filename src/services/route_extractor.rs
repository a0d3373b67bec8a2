// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route and GPS sample extraction for workouts.

use crate::error::Result;
use crate::models::{valid_samples, RouteSample, WorkoutRecord, WorkoutRoute};
use crate::services::health_store::HealthStore;
use futures_util::StreamExt;
use std::sync::Arc;

/// The route chosen to represent a workout and its valid samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoritativeRoute {
    pub route: WorkoutRoute,
    /// Valid samples only, in recorded order (never empty)
    pub samples: Vec<RouteSample>,
}

/// Pulls routes and their samples out of a health store.
pub struct RouteSampleExtractor<H> {
    store: Arc<H>,
}

impl<H> Clone for RouteSampleExtractor<H> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<H: HealthStore> RouteSampleExtractor<H> {
    pub fn new(store: Arc<H>) -> Self {
        Self { store }
    }

    /// All routes recorded for a workout; empty if it has none.
    pub async fn routes(&self, workout: &WorkoutRecord) -> Result<Vec<WorkoutRoute>> {
        self.store.workout_routes(workout).await
    }

    /// Every sample of a route, batches concatenated in delivery order.
    ///
    /// A route with no samples is legal and yields an empty list.
    pub async fn samples(&self, route: &WorkoutRoute) -> Result<Vec<RouteSample>> {
        let mut batches = self.store.route_sample_batches(route);
        let mut samples = Vec::new();
        let mut finished = false;

        while let Some(batch) = batches.next().await {
            let batch = batch?;
            samples.extend(batch.samples);
            if batch.done {
                finished = true;
                break;
            }
        }

        if !finished {
            tracing::debug!(
                route_id = %route.id,
                count = samples.len(),
                "Sample stream ended without a final batch"
            );
        }

        Ok(samples)
    }

    /// The first route of `workout` with at least one valid sample.
    ///
    /// `Ok(None)` means the workout cannot be mapped. Any retrieval failure
    /// is returned as an error so the caller can drop just this workout.
    pub async fn authoritative_route(
        &self,
        workout: &WorkoutRecord,
    ) -> Result<Option<AuthoritativeRoute>> {
        for route in self.routes(workout).await? {
            let samples = valid_samples(&self.samples(&route).await?);
            if !samples.is_empty() {
                return Ok(Some(AuthoritativeRoute { route, samples }));
            }
        }
        Ok(None)
    }

    /// Number of valid samples in the workout's first route (0 on failure).
    pub async fn valid_sample_count(&self, workout: &WorkoutRecord) -> usize {
        let first_route = match self.routes(workout).await {
            Ok(routes) => routes.into_iter().next(),
            Err(e) => {
                tracing::warn!(workout_id = %workout.id, error = %e, "Failed to fetch routes");
                None
            }
        };
        let Some(route) = first_route else {
            return 0;
        };

        match self.samples(&route).await {
            Ok(samples) => samples.iter().filter(|s| s.is_valid()).count(),
            Err(e) => {
                tracing::warn!(route_id = %route.id, error = %e, "Failed to fetch samples");
                0
            }
        }
    }
}
