mod api;
mod config;
mod dto;
mod state;
mod upstream;

use crate::{config::Config, state::AppState, upstream::Upstream};
use axum::routing::{get, post};
use headway::scenario::{self, ScenarioStore};
use std::{sync::Arc, time::Instant};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    info!("Starting server...");
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };
    let upstream = match Upstream::new(&config) {
        Ok(upstream) => upstream,
        Err(err) => {
            error!("Failed to build upstream client: {err}");
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(
        upstream,
        ScenarioStore::new(scenario::Config::default()),
    ));

    info!("Loading routes from {}...", config.api_url);
    let now = Instant::now();
    api::load_routes(state.clone()).await;
    info!("Loading routes took {:?}", now.elapsed());

    let app = axum::Router::new()
        .route("/snapshot", get(api::snapshot))
        .route("/routes", get(api::routes))
        .route("/routes/reload", post(api::reload_routes))
        .route("/routes/{id}/select", post(api::select_route))
        .route("/scenario/{direction}", post(api::adjust_stops))
        .route("/selection/clear", post(api::clear_selection))
        .with_state(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {}: {err}", config.port);
            std::process::exit(1);
        }
    };
    info!("Listening to port {}", config.port);
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server stopped: {err}");
    }
}
