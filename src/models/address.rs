// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Postal address model produced by reverse geocoding.

use serde::{Deserialize, Serialize};

/// Structured address for the start of a workout.
///
/// String fields are empty when the geocoder did not supply them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Place name (e.g. a park or building), if the geocoder has one
    pub name: Option<String>,
}

/// One reverse-geocoding candidate, every field optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placemark {
    pub thoroughfare: Option<String>,
    pub locality: Option<String>,
    pub postal_code: Option<String>,
    pub administrative_area: Option<String>,
    pub name: Option<String>,
}

impl Address {
    /// Build an address from a placemark, defaulting missing strings to empty.
    pub fn from_placemark(placemark: Placemark, latitude: f64, longitude: f64) -> Self {
        Self {
            street: placemark.thoroughfare.unwrap_or_default(),
            city: placemark.locality.unwrap_or_default(),
            postal_code: placemark.postal_code.unwrap_or_default(),
            state: placemark.administrative_area.unwrap_or_default(),
            latitude,
            longitude,
            name: placemark.name,
        }
    }
}
