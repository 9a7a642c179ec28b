#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the heritage map explorer.
//!
//! Serves explore results as JSON, the two map layers as `GeoJSON`, and
//! the record table as CSV. The Europeana client and the country index
//! are built once at startup and shared by every request.

mod handlers;

use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use heritage_map_explorer::{ExploreError, Explorer, ExplorerSettings};
use thiserror::Error;

/// Environment variable naming an optional TOML settings file.
pub const CONFIG_VAR: &str = "HERITAGE_MAP_CONFIG";

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Settings, API key, or country dataset problem at startup.
    #[error(transparent)]
    Explore(#[from] ExploreError),

    /// Binding or serving failed.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Search client plus reference countries.
    pub explorer: Explorer,
    /// Row limit used when a request does not name one.
    pub default_rows: u32,
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/explore", web::get().to(handlers::explore))
            .route(
                "/explore/points.geojson",
                web::get().to(handlers::points_layer),
            )
            .route(
                "/explore/countries.geojson",
                web::get().to(handlers::countries_layer),
            )
            .route("/explore.csv", web::get().to(handlers::records_csv)),
    );
}

/// Starts the heritage map API server.
///
/// Loads settings from the file named by [`CONFIG_VAR`] (if set), builds
/// the explorer, and serves on `BIND_ADDR`:`PORT`. This is a regular
/// async function; the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError::Explore`] if the settings, API key, or country
/// dataset are invalid, and [`ServerError::Io`] if the HTTP server fails
/// to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> Result<(), ServerError> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config_path = std::env::var(CONFIG_VAR).ok().map(PathBuf::from);
    let settings = ExplorerSettings::load(config_path.as_deref())?;

    log::info!("Loading country dataset...");
    let explorer = Explorer::from_settings(&settings)?;
    log::info!(
        "Reference dataset has {} countries",
        explorer.index().len()
    );

    let state = web::Data::new(AppState {
        explorer,
        default_rows: settings.rows,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
