// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout, route and GPS sample models.

use crate::models::address::Address;
use crate::models::weather::WeatherHolder;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Activity type tag attached to a workout by the health store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Walking,
    Running,
    Cycling,
    /// Anything else the store knows about (swimming, yoga, ...)
    #[serde(untagged)]
    Other(String),
}

impl ActivityType {
    /// Activity types the pipeline asks for.
    pub const MAPPABLE: [ActivityType; 3] = [
        ActivityType::Walking,
        ActivityType::Running,
        ActivityType::Cycling,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ActivityType::Walking => "walking",
            ActivityType::Running => "running",
            ActivityType::Cycling => "cycling",
            ActivityType::Other(other) => other,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workout as returned by a health store query. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    /// Stable unique identifier assigned by the store
    pub id: String,
    pub activity_type: ActivityType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Handle to one GPS route recorded for a workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutRoute {
    pub id: String,
    pub workout_id: String,
}

/// A single GPS fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSample {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl RouteSample {
    /// (0, 0) is the "no fix" sentinel; any other coordinate is a measurement.
    pub fn is_valid(&self) -> bool {
        self.latitude != 0.0 || self.longitude != 0.0
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Keep only valid samples, preserving order.
pub fn valid_samples(samples: &[RouteSample]) -> Vec<RouteSample> {
    samples.iter().filter(|s| s.is_valid()).copied().collect()
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

/// One incremental delivery of route samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBatch {
    pub samples: Vec<RouteSample>,
    /// Set on the final batch for the route
    pub done: bool,
}

/// Half-open window `[start, end)` over workout start dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// The window of `days` days ending at (and excluding) `cursor`.
    pub fn ending_at(cursor: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: cursor - Duration::days(i64::from(days)),
            end: cursor,
        }
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.start <= date && date < self.end
    }
}

/// A workout with everything a list row or map needs.
///
/// Built once per page load and never modified afterwards, except for the
/// weather slot which is filled in later on request.
#[derive(Debug)]
pub struct EnrichedWorkout {
    pub workout: WorkoutRecord,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub distance_miles: f64,
    pub address: Option<Address>,
    /// Valid coordinates of the authoritative route, in recorded order
    pub coordinates: Vec<Coordinate>,
    pub weather: WeatherHolder,
}

impl EnrichedWorkout {
    pub fn new(
        workout: WorkoutRecord,
        distance_miles: f64,
        address: Option<Address>,
        coordinates: Vec<Coordinate>,
    ) -> Self {
        Self {
            start_date: workout.start_date,
            end_date: workout.end_date,
            workout,
            distance_miles,
            address,
            coordinates,
            weather: WeatherHolder::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.workout.id
    }

    /// Where the route begins, if it has any coordinates at all.
    pub fn first_coordinate(&self) -> Option<Coordinate> {
        self.coordinates.first().copied()
    }

    /// Resolved city, or "Unknown City".
    pub fn city_name(&self) -> &str {
        self.address
            .as_ref()
            .map(|a| a.city.as_str())
            .filter(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_CITY)
    }
}

pub const UNKNOWN_CITY: &str = "Unknown City";

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(latitude: f64, longitude: f64) -> RouteSample {
        RouteSample {
            latitude,
            longitude,
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_zero_zero_is_invalid() {
        assert!(!sample(0.0, 0.0).is_valid());
    }

    #[test]
    fn test_single_zero_axis_is_valid() {
        assert!(sample(0.0, -122.1).is_valid());
        assert!(sample(37.4, 0.0).is_valid());
        assert!(sample(37.4, -122.1).is_valid());
    }

    #[test]
    fn test_valid_samples_keeps_order() {
        let samples = vec![
            sample(1.0, 1.0),
            sample(0.0, 0.0),
            sample(2.0, 2.0),
            sample(0.0, 0.0),
            sample(0.0, 3.0),
        ];
        let valid = valid_samples(&samples);
        let lats: Vec<f64> = valid.iter().map(|s| s.latitude).collect();
        assert_eq!(lats, vec![1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_window_is_half_open() {
        let cursor = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let window = DateWindow::ending_at(cursor, 7);
        assert!(!window.contains(cursor));
        assert!(window.contains(cursor - Duration::seconds(1)));
        assert!(window.contains(window.start));
        assert_eq!(cursor - window.start, Duration::days(7));
    }

    #[test]
    fn test_activity_type_serde() {
        let parsed: ActivityType = serde_json::from_str("\"cycling\"").unwrap();
        assert_eq!(parsed, ActivityType::Cycling);

        let other: ActivityType = serde_json::from_str("\"swimming\"").unwrap();
        assert_eq!(other, ActivityType::Other("swimming".to_string()));
        assert!(!ActivityType::MAPPABLE.contains(&other));
    }

    #[test]
    fn test_city_name_fallback() {
        let workout = WorkoutRecord {
            id: "w1".to_string(),
            activity_type: ActivityType::Running,
            start_date: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            end_date: DateTime::from_timestamp(1_700_003_600, 0).unwrap(),
        };
        let enriched = EnrichedWorkout::new(workout.clone(), 3.1, None, vec![]);
        assert_eq!(enriched.city_name(), UNKNOWN_CITY);
        assert!(enriched.first_coordinate().is_none());

        let address = Address {
            city: "Cupertino".to_string(),
            ..Address::default()
        };
        let enriched = EnrichedWorkout::new(workout, 3.1, Some(address), vec![]);
        assert_eq!(enriched.city_name(), "Cupertino");
    }
}
