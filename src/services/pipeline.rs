// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page loading: from a cursor to a list of enriched workouts.
//!
//! For each page:
//! 1. Query mappable workouts in `[cursor - window, cursor)`
//! 2. Re-extract the first route with a valid sample
//! 3. Sum the route distance
//! 4. Reverse geocode the first valid sample
//!
//! Workouts are processed one at a time to keep load on the health store
//! and geocoder bounded.

use crate::error::Result;
use crate::models::{ActivityType, DateWindow, EnrichedWorkout, WorkoutRecord};
use crate::services::distance::route_distance_miles;
use crate::services::geocoder::{AddressResolver, ReverseGeocoder};
use crate::services::health_store::HealthStore;
use crate::services::route_extractor::RouteSampleExtractor;
use crate::services::workout_query::WorkoutQueryService;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Builds pages of enriched workouts. Holds no pagination state.
pub struct WorkoutAggregationPipeline<H, G> {
    queries: WorkoutQueryService<H>,
    extractor: RouteSampleExtractor<H>,
    addresses: AddressResolver<G>,
}

impl<H: HealthStore, G: ReverseGeocoder> WorkoutAggregationPipeline<H, G> {
    pub fn new(store: Arc<H>, geocoder: Arc<G>) -> Self {
        Self {
            queries: WorkoutQueryService::new(Arc::clone(&store)),
            extractor: RouteSampleExtractor::new(store),
            addresses: AddressResolver::new(geocoder),
        }
    }

    /// Load the page of walks, runs and rides that started in the
    /// `window_days` days before `cursor`, newest first.
    ///
    /// Only a failed workout query is an error; nothing is returned for
    /// the page in that case.
    pub async fn load_page(
        &self,
        cursor: DateTime<Utc>,
        window_days: u32,
        limit: usize,
    ) -> Result<Vec<EnrichedWorkout>> {
        let window = DateWindow::ending_at(cursor, window_days);
        tracing::info!(%cursor, window_days, limit, "Loading workout page");

        let workouts = self
            .queries
            .fetch_workouts(window, &ActivityType::MAPPABLE, limit)
            .await?;

        let mut page = Vec::with_capacity(workouts.len());
        for workout in workouts {
            if let Some(enriched) = self.enrich(workout).await {
                page.push(enriched);
            }
        }

        tracing::info!(count = page.len(), "Loaded workout page");
        Ok(page)
    }

    async fn enrich(&self, workout: WorkoutRecord) -> Option<EnrichedWorkout> {
        let route = match self.extractor.authoritative_route(&workout).await {
            Ok(Some(route)) => route,
            Ok(None) => {
                tracing::debug!(workout_id = %workout.id, "Dropping workout: no valid samples");
                return None;
            }
            Err(e) => {
                tracing::warn!(workout_id = %workout.id, error = %e, "Dropping workout: route extraction failed");
                return None;
            }
        };

        let distance_miles = route_distance_miles(&route.samples);
        let coordinates: Vec<_> = route.samples.iter().map(|s| s.coordinate()).collect();

        // authoritative_route never returns an empty sample list
        let address = match coordinates.first() {
            Some(first) => self.addresses.resolve(*first).await,
            None => None,
        };

        tracing::debug!(
            workout_id = %workout.id,
            route_id = %route.route.id,
            samples = coordinates.len(),
            distance_miles,
            "Enriched workout"
        );

        Some(EnrichedWorkout::new(
            workout,
            distance_miles,
            address,
            coordinates,
        ))
    }
}

/// Start date of the oldest workout in a page, the next page's cursor.
pub fn next_cursor(page: &[EnrichedWorkout]) -> Option<DateTime<Utc>> {
    page.last().map(|w| w.start_date)
}
