// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trailcast API Server
//!
//! Serves paginated workouts from a health data export, enriched with
//! route distance, start address and historical weather.

use std::sync::Arc;
use trailcast::{config::Config, services::ExportHealthStore, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Trailcast API");

    // Load the health data export
    tracing::info!(path = %config.health_export_path, "Loading health export");
    let store = ExportHealthStore::load_from_file(&config.health_export_path)?;
    tracing::info!(count = store.workout_count(), "Health export loaded");

    tracing::info!(
        geocoder = %config.nominatim_url,
        weather = %config.open_meteo_archive_url,
        "External services configured"
    );

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store));

    // Build router
    let app = trailcast::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trailcast=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
