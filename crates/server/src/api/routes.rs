use crate::{dto::RouteDto, state::AppState};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::{sync::Arc, time::Instant};
use tracing::{debug, info};

pub async fn routes(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    let store = state.store.read().await;
    let result: Vec<_> = store
        .routes()
        .iter()
        .map(|route| RouteDto::from(route, &store))
        .collect();
    Ok(Json(result).into_response())
}

/// Starts a route reload in the background and answers with the current
/// snapshot, which carries the loading flag.
pub async fn reload_routes(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    {
        let mut store = state.store.write().await;
        if store.snapshot().loading_flags.routes {
            debug!("Route reload already running");
            return Ok((StatusCode::ACCEPTED, Json(store.snapshot())).into_response());
        }
        store.begin_routes_load();
    }
    tokio::spawn(fetch_routes(state.clone()));

    let store = state.store.read().await;
    Ok((StatusCode::ACCEPTED, Json(store.snapshot())).into_response())
}

pub async fn load_routes(state: Arc<AppState>) {
    state.store.write().await.begin_routes_load();
    fetch_routes(state).await;
}

async fn fetch_routes(state: Arc<AppState>) {
    let now = Instant::now();
    let result = state.upstream.routes().await;
    if let Ok(routes) = &result {
        info!("Fetched {} routes in {:?}", routes.len(), now.elapsed());
    }
    state.store.write().await.set_routes(result);
}
