use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use headway::scenario::{self, Direction, SelectOutcome};
use std::sync::Arc;
use tracing::{debug, error, warn};

fn status_for(err: &scenario::Error) -> StatusCode {
    match err {
        scenario::Error::UnknownRoute(_) => StatusCode::NOT_FOUND,
        scenario::Error::NoSelection | scenario::Error::NotReady(_) => StatusCode::CONFLICT,
    }
}

pub async fn snapshot(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    let store = state.store.read().await;
    Ok(Json(store.snapshot()).into_response())
}

pub async fn select_route(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let outcome = state.store.write().await.select_route(&id).map_err(|err| {
        warn!("Failed to select route: {err}");
        status_for(&err)
    })?;

    if let SelectOutcome::Fetch { route_id, token } = outcome {
        let state = state.clone();
        tokio::spawn(async move {
            let result = state.upstream.stops_for_route(&route_id).await;
            if let Err(err) = &result {
                error!("Failed to fetch stops for route {route_id}: {err}");
            }
            let applied = state
                .store
                .write()
                .await
                .complete_stop_fetch(&route_id, token, result);
            debug!("Stop response for route {route_id} applied: {applied}");
        });
    }

    let store = state.store.read().await;
    Ok(Json(store.snapshot()).into_response())
}

pub async fn adjust_stops(
    Path(direction): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let direction = match direction.as_str() {
        "increase" => Direction::Increase,
        "decrease" => Direction::Decrease,
        _ => return Err(StatusCode::BAD_REQUEST),
    };

    let mut store = state.store.write().await;
    store.adjust_stops(direction).map_err(|err| {
        warn!("Failed to adjust stops: {err}");
        status_for(&err)
    })?;
    Ok(Json(store.snapshot()).into_response())
}

pub async fn clear_selection(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    let mut store = state.store.write().await;
    store.clear_selection();
    Ok(Json(store.snapshot()).into_response())
}
