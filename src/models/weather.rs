// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Historical weather models and unit conversions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, RwLock};

/// Kilometres per mile, for wind speed presentation.
const KM_PER_MILE: f64 = 1.609_344;

/// Daily weather conditions for a workout's place and day.
///
/// Every field is optional: the provider may have no data or only partial
/// data for the day. Temperatures are Celsius, wind speed km/h.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Icon/category identifier (e.g. "cloud.rain")
    pub symbol_name: Option<String>,
    pub condition: Option<String>,
    pub min_temp_celsius: Option<f64>,
    pub max_temp_celsius: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub precipitation: Option<String>,
    /// Dominant wind direction, degrees clockwise from north
    pub wind_direction_degrees: Option<f64>,
}

impl WeatherSnapshot {
    /// A snapshot with every field absent.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn wind_direction(&self) -> Option<CardinalDirection> {
        self.wind_direction_degrees
            .map(CardinalDirection::from_degrees)
    }
}

impl From<DailyWeather> for WeatherSnapshot {
    fn from(day: DailyWeather) -> Self {
        Self {
            symbol_name: day.symbol_name,
            condition: day.condition,
            min_temp_celsius: day.min_temp_celsius,
            max_temp_celsius: day.max_temp_celsius,
            wind_speed_kmh: day.wind_speed_kmh,
            precipitation: day.precipitation.map(|p| p.to_string()),
            wind_direction_degrees: day.wind_direction_degrees,
        }
    }
}

/// One daily summary returned by a weather history provider.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyWeather {
    pub date: NaiveDate,
    pub symbol_name: Option<String>,
    pub condition: Option<String>,
    pub min_temp_celsius: Option<f64>,
    pub max_temp_celsius: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_degrees: Option<f64>,
    pub precipitation: Option<Precipitation>,
}

/// Kind of precipitation observed over a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precipitation {
    None,
    Rain,
    Snow,
    Sleet,
    Hail,
}

impl fmt::Display for Precipitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Precipitation::None => "none",
            Precipitation::Rain => "rain",
            Precipitation::Snow => "snow",
            Precipitation::Sleet => "sleet",
            Precipitation::Hail => "hail",
        };
        f.write_str(s)
    }
}

/// Eight-point compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardinalDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CardinalDirection {
    const ORDER: [CardinalDirection; 8] = [
        CardinalDirection::N,
        CardinalDirection::NE,
        CardinalDirection::E,
        CardinalDirection::SE,
        CardinalDirection::S,
        CardinalDirection::SW,
        CardinalDirection::W,
        CardinalDirection::NW,
    ];

    /// Map a bearing to the nearest compass point (45° sectors centred on
    /// each point, so 22.5° and up is NE).
    pub fn from_degrees(degrees: f64) -> Self {
        if !degrees.is_finite() {
            return CardinalDirection::N;
        }
        let normalized = degrees.rem_euclid(360.0);
        let sector = ((normalized + 22.5) / 45.0).floor() as usize % 8;
        Self::ORDER[sector]
    }
}

/// Convert Celsius to Fahrenheit (`F = C × 9/5 + 32`).
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh / KM_PER_MILE
}

/// Shared slot a weather lookup writes into.
///
/// Clones share the same slot. Writes to different holders never interact.
/// Lookups for one holder are serialized through `lock_fetch`.
#[derive(Debug, Clone, Default)]
pub struct WeatherHolder {
    slot: Arc<RwLock<Option<WeatherSnapshot>>>,
    fetch: Arc<tokio::sync::Mutex<()>>,
}

impl WeatherHolder {
    pub fn set(&self, snapshot: WeatherSnapshot) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(snapshot);
    }

    /// The resolved snapshot, or `None` if no lookup has succeeded yet.
    pub fn get(&self) -> Option<WeatherSnapshot> {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Wait until no other lookup for this holder is running.
    pub async fn lock_fetch(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.fetch.lock().await
    }
}
