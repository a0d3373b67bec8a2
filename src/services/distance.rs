// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Great-circle route distance.

use crate::models::RouteSample;
use geo::{Distance, Haversine};

/// Metres in one statute mile.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Sum of great-circle distances between consecutive samples, in metres.
///
/// Samples are taken in the order given. Zero or one sample is 0.
pub fn route_distance_meters(samples: &[RouteSample]) -> f64 {
    samples
        .windows(2)
        .map(|pair| {
            Haversine.distance(pair[0].coordinate().to_point(), pair[1].coordinate().to_point())
        })
        .sum()
}

/// Route distance in miles, converted once from the metre total.
pub fn route_distance_miles(samples: &[RouteSample]) -> f64 {
    meters_to_miles(route_distance_meters(samples))
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}
