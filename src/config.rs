// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

/// Largest page size a session may request.
pub const MAX_PAGE_LIMIT: u32 = 500;
/// Longest pagination window, in days.
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Path of the read-only health data export
    pub health_export_path: String,
    /// Base URL of a Nominatim-compatible reverse geocoder
    pub nominatim_url: String,
    /// Base URL of the Open-Meteo historical archive
    pub open_meteo_archive_url: String,
    /// User-Agent sent to the geocoder (Nominatim requires one)
    pub geocoder_user_agent: String,
    /// Default pagination window for new sessions
    pub default_window_days: u32,
    /// Default page size for new sessions
    pub default_page_limit: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let config = Self {
            port: parse_var("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            health_export_path: env::var("HEALTH_EXPORT_PATH")
                .unwrap_or_else(|_| "data/health_export.json".to_string()),
            nominatim_url: env::var("NOMINATIM_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            open_meteo_archive_url: env::var("OPEN_METEO_ARCHIVE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://archive-api.open-meteo.com".to_string()),
            geocoder_user_agent: env::var("GEOCODER_USER_AGENT")
                .unwrap_or_else(|_| concat!("trailcast/", env!("CARGO_PKG_VERSION")).to_string()),
            default_window_days: parse_var("DEFAULT_WINDOW_DAYS", 90)?,
            default_page_limit: parse_var("DEFAULT_PAGE_LIMIT", 50)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            health_export_path: "data/health_export.json".to_string(),
            // Nothing listens here; lookups fail fast and resolve to "absent".
            nominatim_url: "http://127.0.0.1:9".to_string(),
            open_meteo_archive_url: "http://127.0.0.1:9".to_string(),
            geocoder_user_agent: "trailcast-tests".to_string(),
            default_window_days: 90,
            default_page_limit: 50,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_WINDOW_DAYS).contains(&self.default_window_days) {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_WINDOW_DAYS",
                value: self.default_window_days.to_string(),
            });
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&self.default_page_limit) {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_PAGE_LIMIT",
                value: self.default_page_limit.to_string(),
            });
        }
        Ok(())
    }
}

/// Read an optional numeric variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
