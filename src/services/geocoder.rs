// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reverse geocoding: coordinate to postal address.
//!
//! Handles:
//! - Nominatim-compatible reverse lookups
//! - Mapping the first candidate into an `Address`
//! - Turning every failure into "no address"

use crate::error::{AppError, Result};
use crate::models::{Address, Coordinate, Placemark};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;

/// A reverse-geocoding provider.
pub trait ReverseGeocoder: Send + Sync + 'static {
    /// Candidate placemarks for a coordinate, best first. May be empty.
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> impl Future<Output = Result<Vec<Placemark>>> + Send;
}

/// Reverse geocoder client for OSM Nominatim (or a compatible server).
#[derive(Clone)]
pub struct NominatimGeocoder {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Check response status and return error if not successful.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Geocoder rate limit hit (429)");
                return Err(AppError::Geocoding("rate limited".to_string()));
            }

            return Err(AppError::Geocoding(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Geocoding(format!("JSON parse error: {}", e)))
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Vec<Placemark>> {
        let url = format!("{}/reverse", self.base_url);

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Geocoding(e.to_string()))?;

        let reverse: NominatimReverse = self.check_response_json(response).await?;
        Ok(reverse.into_placemark().into_iter().collect())
    }
}

/// Nominatim `/reverse` response (jsonv2).
#[derive(Debug, Deserialize)]
struct NominatimReverse {
    /// Present instead of a result when nothing was found
    error: Option<String>,
    name: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    pedestrian: Option<String>,
    path: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    postcode: Option<String>,
    state: Option<String>,
}

impl NominatimReverse {
    fn into_placemark(self) -> Option<Placemark> {
        if let Some(error) = self.error {
            tracing::debug!(error = %error, "Geocoder returned no result");
            return None;
        }

        let address = self.address.unwrap_or_default();
        Some(Placemark {
            thoroughfare: address.road.or(address.pedestrian).or(address.path),
            locality: address
                .city
                .or(address.town)
                .or(address.village)
                .or(address.hamlet),
            postal_code: address.postcode,
            administrative_area: address.state,
            name: self.name.filter(|n| !n.is_empty()),
        })
    }
}

/// Resolves a coordinate to an address, never failing.
///
/// No caching: repeated lookups of the same coordinate hit the geocoder
/// every time.
pub struct AddressResolver<G> {
    geocoder: Arc<G>,
}

impl<G> Clone for AddressResolver<G> {
    fn clone(&self) -> Self {
        Self {
            geocoder: Arc::clone(&self.geocoder),
        }
    }
}

impl<G: ReverseGeocoder> AddressResolver<G> {
    pub fn new(geocoder: Arc<G>) -> Self {
        Self { geocoder }
    }

    /// The address of the first candidate, or `None` on miss or failure.
    pub async fn resolve(&self, coordinate: Coordinate) -> Option<Address> {
        match self.geocoder.reverse_geocode(coordinate).await {
            Ok(placemarks) => {
                let address = placemarks.into_iter().next().map(|p| {
                    Address::from_placemark(p, coordinate.latitude, coordinate.longitude)
                });
                if address.is_none() {
                    tracing::debug!(
                        latitude = coordinate.latitude,
                        longitude = coordinate.longitude,
                        "No address for coordinate"
                    );
                }
                address
            }
            Err(e) => {
                tracing::warn!(
                    latitude = coordinate.latitude,
                    longitude = coordinate.longitude,
                    error = %e,
                    "Address not found"
                );
                None
            }
        }
    }
}
