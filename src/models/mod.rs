// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod address;
pub mod weather;
pub mod workout;

pub use address::{Address, Placemark};
pub use weather::{
    celsius_to_fahrenheit, kmh_to_mph, CardinalDirection, DailyWeather, Precipitation,
    WeatherHolder, WeatherSnapshot,
};
pub use workout::{
    valid_samples, ActivityType, Coordinate, DateWindow, EnrichedWorkout, RouteSample,
    SampleBatch, WorkoutRecord, WorkoutRoute,
};
