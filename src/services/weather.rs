// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Historical weather lookups for a workout's place and day.

use crate::error::{AppError, Result};
use crate::models::{Coordinate, DailyWeather, Precipitation, WeatherHolder, WeatherSnapshot};
use crate::time_utils::weather_day_span;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;

/// Daily variables requested from the archive, in response order.
const DAILY_VARIABLES: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,wind_speed_10m_max,wind_direction_10m_dominant";

/// A daily-resolution weather history provider.
pub trait WeatherHistoryProvider: Send + Sync + 'static {
    /// Daily summaries for `start..=end` at `coordinate`. May be empty.
    fn daily_history(
        &self,
        coordinate: Coordinate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<DailyWeather>>> + Send;
}

/// Client for the Open-Meteo historical weather archive.
#[derive(Clone)]
pub struct OpenMeteoArchive {
    http: reqwest::Client,
    base_url: String,
}

impl OpenMeteoArchive {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl WeatherHistoryProvider for OpenMeteoArchive {
    async fn daily_history(
        &self,
        coordinate: Coordinate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyWeather>> {
        let url = format!("{}/v1/archive", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("latitude", coordinate.latitude.to_string()),
                ("longitude", coordinate.longitude.to_string()),
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end.format("%Y-%m-%d").to_string()),
                ("daily", DAILY_VARIABLES.to_string()),
                ("timezone", "UTC".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Weather(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ArchiveError>(&body)
                .map(|e| e.reason)
                .unwrap_or(body);
            return Err(AppError::Weather(format!("HTTP {}: {}", status, reason)));
        }

        let archive: ArchiveResponse = response
            .json()
            .await
            .map_err(|e| AppError::Weather(format!("JSON parse error: {}", e)))?;

        archive.into_days()
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveError {
    reason: String,
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    daily: Option<ArchiveDaily>,
}

/// Column-oriented daily data; every column is indexed like `time`.
#[derive(Debug, Default, Deserialize)]
struct ArchiveDaily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    weather_code: Vec<Option<u32>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    wind_direction_10m_dominant: Vec<Option<f64>>,
}

fn column<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

impl ArchiveResponse {
    fn into_days(self) -> Result<Vec<DailyWeather>> {
        let Some(daily) = self.daily else {
            return Ok(Vec::new());
        };

        daily
            .time
            .iter()
            .enumerate()
            .map(|(i, day)| {
                let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .map_err(|e| AppError::Weather(format!("Invalid date {:?}: {}", day, e)))?;
                let code = column(&daily.weather_code, i).map(WmoCode);

                Ok(DailyWeather {
                    date,
                    symbol_name: code.map(|c| c.symbol_name().to_string()),
                    condition: code.map(|c| c.condition().to_string()),
                    min_temp_celsius: column(&daily.temperature_2m_min, i),
                    max_temp_celsius: column(&daily.temperature_2m_max, i),
                    wind_speed_kmh: column(&daily.wind_speed_10m_max, i),
                    wind_direction_degrees: column(&daily.wind_direction_10m_dominant, i),
                    precipitation: code.map(|c| c.precipitation()),
                })
            })
            .collect()
    }
}

/// WMO 4677 present-weather code as used by Open-Meteo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WmoCode(u32);

impl WmoCode {
    fn symbol_name(self) -> &'static str {
        match self.0 {
            0 | 1 => "sun.max",
            2 => "cloud.sun",
            3 => "cloud",
            45 | 48 => "cloud.fog",
            51 | 53 | 55 => "cloud.drizzle",
            56 | 57 | 66 | 67 => "cloud.sleet",
            61 | 63 | 80 | 81 => "cloud.rain",
            65 | 82 => "cloud.heavyrain",
            71 | 73 | 75 | 77 | 85 | 86 => "cloud.snow",
            95 | 96 | 99 => "cloud.bolt.rain",
            _ => "questionmark",
        }
    }

    fn condition(self) -> &'static str {
        match self.0 {
            0 => "Clear",
            1 => "Mostly Clear",
            2 => "Partly Cloudy",
            3 => "Cloudy",
            45 | 48 => "Foggy",
            51 | 53 | 55 => "Drizzle",
            56 | 57 => "Freezing Drizzle",
            61 | 63 => "Rain",
            65 => "Heavy Rain",
            66 | 67 => "Freezing Rain",
            71 | 73 => "Snow",
            75 => "Heavy Snow",
            77 => "Snow Grains",
            80 | 81 => "Rain Showers",
            82 => "Heavy Rain Showers",
            85 | 86 => "Snow Showers",
            95 => "Thunderstorms",
            96 | 99 => "Thunderstorms with Hail",
            _ => "Unknown",
        }
    }

    fn precipitation(self) -> Precipitation {
        match self.0 {
            51..=55 | 61..=65 | 80..=82 | 95 => Precipitation::Rain,
            56 | 57 | 66 | 67 => Precipitation::Sleet,
            71..=77 | 85 | 86 => Precipitation::Snow,
            96 | 99 => Precipitation::Hail,
            _ => Precipitation::None,
        }
    }
}

/// Looks up the weather on the day a workout started.
///
/// Failures never escape: the result is a snapshot with absent fields.
pub struct WeatherHistoryResolver<W> {
    provider: Arc<W>,
}

impl<W> Clone for WeatherHistoryResolver<W> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<W: WeatherHistoryProvider> WeatherHistoryResolver<W> {
    pub fn new(provider: Arc<W>) -> Self {
        Self { provider }
    }

    /// Weather for the calendar day (UTC) on which `window_start` falls.
    ///
    /// The request always spans exactly one day past that date, whatever
    /// `window_end` is; only the first daily entry is used. A reply with no
    /// days is an all-absent snapshot, not an error.
    pub async fn fetch_historical_weather(
        &self,
        coordinate: Coordinate,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<WeatherSnapshot> {
        let (start_day, end_day) = weather_day_span(window_start);
        tracing::debug!(
            latitude = coordinate.latitude,
            longitude = coordinate.longitude,
            %start_day,
            %end_day,
            %window_end,
            "Fetching historical weather"
        );

        let days = self
            .provider
            .daily_history(coordinate, start_day, end_day)
            .await?;
        Ok(days
            .into_iter()
            .next()
            .map(WeatherSnapshot::from)
            .unwrap_or_default())
    }

    /// Like `fetch_historical_weather`, but a failure is logged and
    /// reported as an all-absent snapshot.
    pub async fn resolve_historical_weather(
        &self,
        coordinate: Coordinate,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> WeatherSnapshot {
        match self
            .fetch_historical_weather(coordinate, window_start, window_end)
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    latitude = coordinate.latitude,
                    longitude = coordinate.longitude,
                    error = %e,
                    "Error fetching historical weather"
                );
                WeatherSnapshot::empty()
            }
        }
    }

    /// Resolve weather and store it in `holder`.
    ///
    /// Only a successful provider reply is stored. After a failure the
    /// holder stays unresolved so a later request tries again; the caller
    /// still gets an all-absent snapshot.
    pub async fn resolve_into(
        &self,
        coordinate: Coordinate,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        holder: &WeatherHolder,
    ) -> WeatherSnapshot {
        match self
            .fetch_historical_weather(coordinate, window_start, window_end)
            .await
        {
            Ok(snapshot) => {
                holder.set(snapshot.clone());
                snapshot
            }
            Err(e) => {
                tracing::warn!(
                    latitude = coordinate.latitude,
                    longitude = coordinate.longitude,
                    error = %e,
                    "Error fetching historical weather; will retry on next request"
                );
                WeatherSnapshot::empty()
            }
        }
    }
}
