//! ElectroMove operator console HTTP API.
//!
//! Exposes the entity store and pricing engine to the render/CLI side and
//! mirrors the upstream data API into them on demand. All mutation flows
//! through the engines' own operations; the handlers never touch entity
//! internals.

pub mod pricing;
pub mod remote;
pub mod station;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use emove_core::{Customer, EntityStore};
use emove_pricing::PriceBook;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::remote::{RemoteApi, Snapshot};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
}

/// Everything the console owns: the entity tree, the price schedule, and
/// the customer list mirrored from upstream.
#[derive(Debug, Default)]
pub struct ConsoleState {
    pub store: EntityStore,
    pub prices: PriceBook,
    pub customers: Vec<Customer>,
    applied_seq: u64,
}

impl ConsoleState {
    pub fn new() -> Self {
        ConsoleState::default()
    }
}

pub type SharedConsole = Arc<Mutex<ConsoleState>>;

#[derive(Clone)]
pub struct AppState {
    console: SharedConsole,
    remote: RemoteApi,
    load_seq: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(console: ConsoleState, remote: RemoteApi) -> Self {
        AppState {
            console: Arc::new(Mutex::new(console)),
            remote,
            load_seq: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl FromRef<AppState> for SharedConsole {
    fn from_ref(state: &AppState) -> SharedConsole {
        state.console.clone()
    }
}

/// Applies a resolved load if no newer one landed first. Loads can overlap
/// (nothing cancels an in-flight request), so a slow stale response must
/// not clobber a faster newer one: last *started* load wins.
fn apply_snapshot(console: &mut ConsoleState, snapshot: Snapshot, seq: u64) -> bool {
    if seq <= console.applied_seq {
        tracing::warn!(
            "Discarding stale load {} (load {} already applied)",
            seq,
            console.applied_seq
        );
        return false;
    }
    console.store.replace_all(snapshot.stations);
    console.prices.replace_all(snapshot.prices);
    console.customers = snapshot.customers;
    console.applied_seq = seq;
    true
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub applied: bool,
    pub stations: usize,
    pub customers: usize,
    pub prices: usize,
}

/// Reload the three upstream collections into the console
pub async fn refresh(State(app): State<AppState>) -> impl IntoResponse {
    let seq = app.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
    match app.remote.fetch_snapshot().await {
        Ok(snapshot) => {
            let (stations, customers, prices) = (
                snapshot.stations.len(),
                snapshot.customers.len(),
                snapshot.prices.len(),
            );
            let mut console = app.console.lock().unwrap();
            let applied = apply_snapshot(&mut console, snapshot, seq);
            (
                StatusCode::OK,
                Json(RefreshResponse {
                    applied,
                    stations,
                    customers,
                    prices,
                }),
            )
                .into_response()
        }
        Err(error) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: error.to_string(),
            }),
        )
            .into_response(),
    }
}

/// List customers from the last applied load
pub async fn list_customers(State(console): State<SharedConsole>) -> Json<Vec<Customer>> {
    let console = console.lock().unwrap();
    Json(console.customers.clone())
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Create the application router with all endpoints
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/stations",
            get(station::list_stations).post(station::create_station),
        )
        .route(
            "/stations/{station_id}",
            get(station::get_station).delete(station::delete_station),
        )
        .route("/stations/{station_id}/points", post(station::create_point))
        .route(
            "/stations/{station_id}/points/{point_id}",
            delete(station::delete_point),
        )
        .route(
            "/stations/{station_id}/points/{point_id}/ports/{port_id}",
            put(station::update_port).delete(station::delete_port),
        )
        .route("/customers", get(list_customers))
        .route(
            "/prices",
            get(pricing::list_prices).post(pricing::create_price),
        )
        .route("/prices/{price_id}", put(pricing::update_price))
        .route("/prices/{price_id}/activate", post(pricing::activate_price))
        .route("/refresh", post(refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
