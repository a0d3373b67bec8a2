// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod distance;
pub mod export_store;
pub mod geocoder;
pub mod health_store;
pub mod pipeline;
pub mod route_extractor;
pub mod session;
pub mod weather;
pub mod workout_query;

pub use distance::{meters_to_miles, route_distance_meters, route_distance_miles, METERS_PER_MILE};
pub use export_store::{ExportError, ExportHealthStore, ExportedRoute, ExportedWorkout};
pub use geocoder::{AddressResolver, NominatimGeocoder, ReverseGeocoder};
pub use health_store::{HealthDataKind, HealthStore, WorkoutQuery};
pub use pipeline::{next_cursor, WorkoutAggregationPipeline};
pub use route_extractor::{AuthoritativeRoute, RouteSampleExtractor};
pub use session::{LoadOutcome, QueryParams, SessionPhase, SessionSnapshot, WorkoutSession};
pub use weather::{OpenMeteoArchive, WeatherHistoryProvider, WeatherHistoryResolver};
pub use workout_query::WorkoutQueryService;
