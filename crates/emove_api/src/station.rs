use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use emove_core::{NewStation, Point, Port, PortStatus, Station, StoreError};
use serde::{Deserialize, Serialize};

use crate::{ErrorResponse, SharedConsole};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePortRequest {
    pub power: u32,
    pub status: PortStatus,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationResponse {
    pub station: Station,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointResponse {
    pub point: Point,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortResponse {
    pub port: Port,
}

fn store_error_to_response(error: StoreError) -> impl IntoResponse {
    let status = match error {
        StoreError::Validation { .. } => StatusCode::BAD_REQUEST,
        StoreError::StationNotFound { .. }
        | StoreError::PointNotFound { .. }
        | StoreError::PortNotFound { .. } => StatusCode::NOT_FOUND,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

/// List all stations in the store
pub async fn list_stations(State(console): State<SharedConsole>) -> Json<Vec<Station>> {
    let console = console.lock().unwrap();
    Json(console.store.stations().to_vec())
}

/// Look up one station by its numeric ID
pub async fn get_station(
    State(console): State<SharedConsole>,
    Path(station_id): Path<u32>,
) -> impl IntoResponse {
    let console = console.lock().unwrap();
    match console.store.station(station_id) {
        Ok(station) => (
            StatusCode::OK,
            Json(StationResponse {
                station: station.clone(),
            }),
        )
            .into_response(),
        Err(error) => store_error_to_response(error).into_response(),
    }
}

/// Add a new station; the ID is allocated server-side
pub async fn create_station(
    State(console): State<SharedConsole>,
    Json(payload): Json<NewStation>,
) -> impl IntoResponse {
    let mut console = console.lock().unwrap();
    match console.store.add_station(payload) {
        Ok(station) => (StatusCode::CREATED, Json(StationResponse { station })).into_response(),
        Err(error) => store_error_to_response(error).into_response(),
    }
}

/// Remove a station and everything it owns
pub async fn delete_station(
    State(console): State<SharedConsole>,
    Path(station_id): Path<u32>,
) -> impl IntoResponse {
    let mut console = console.lock().unwrap();
    match console.store.remove_station(station_id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => store_error_to_response(error).into_response(),
    }
}

/// Add a point (with its templated ports) to a station
pub async fn create_point(
    State(console): State<SharedConsole>,
    Path(station_id): Path<u32>,
) -> impl IntoResponse {
    let mut console = console.lock().unwrap();
    match console.store.add_point(station_id) {
        Ok(point) => (StatusCode::CREATED, Json(PointResponse { point })).into_response(),
        Err(error) => store_error_to_response(error).into_response(),
    }
}

/// Remove a point and its ports
pub async fn delete_point(
    State(console): State<SharedConsole>,
    Path((station_id, point_id)): Path<(u32, String)>,
) -> impl IntoResponse {
    let mut console = console.lock().unwrap();
    match console.store.remove_point(station_id, &point_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => store_error_to_response(error).into_response(),
    }
}

/// Remove a single port
pub async fn delete_port(
    State(console): State<SharedConsole>,
    Path((station_id, point_id, port_id)): Path<(u32, String, String)>,
) -> impl IntoResponse {
    let mut console = console.lock().unwrap();
    match console.store.remove_port(station_id, &point_id, &port_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => store_error_to_response(error).into_response(),
    }
}

/// Edit a port's power rating and status
pub async fn update_port(
    State(console): State<SharedConsole>,
    Path((station_id, point_id, port_id)): Path<(u32, String, String)>,
    Json(payload): Json<UpdatePortRequest>,
) -> impl IntoResponse {
    let mut console = console.lock().unwrap();
    match console.store.update_port(
        station_id,
        &point_id,
        &port_id,
        payload.power,
        payload.status,
    ) {
        Ok(port) => (StatusCode::OK, Json(PortResponse { port })).into_response(),
        Err(error) => store_error_to_response(error).into_response(),
    }
}
