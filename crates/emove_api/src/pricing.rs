use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Local, NaiveDate};
use emove_core::{PriceEntry, PriceStatus};
use emove_pricing::{PriceInput, PricingError};
use serde::{Deserialize, Serialize};

use crate::{ErrorResponse, SharedConsole};

/// A price entry as shown to callers: status already folded through the
/// expiry rule, with the derived flag alongside.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceView {
    pub id: u32,
    pub price_per_kwh: f64,
    pub penalty_fee_per_minute: f64,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub status: PriceStatus,
    pub expired: bool,
}

impl PriceView {
    fn from_entry(entry: &PriceEntry, today: NaiveDate) -> Self {
        PriceView {
            id: entry.id,
            price_per_kwh: entry.price_per_kwh,
            penalty_fee_per_minute: entry.penalty_fee_per_minute,
            valid_from: entry.valid_from,
            valid_to: entry.valid_to,
            status: entry.presented_status(today),
            expired: entry.is_expired(today),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub price: PriceView,
}

fn pricing_error_to_response(error: PricingError) -> impl IntoResponse {
    let status = match error {
        PricingError::Validation { .. } => StatusCode::BAD_REQUEST,
        PricingError::NotFound { .. } => StatusCode::NOT_FOUND,
        PricingError::Expired { .. } => StatusCode::CONFLICT,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// List the full price schedule
pub async fn list_prices(State(console): State<SharedConsole>) -> Json<Vec<PriceView>> {
    let console = console.lock().unwrap();
    let today = today();
    Json(
        console
            .prices
            .entries()
            .iter()
            .map(|entry| PriceView::from_entry(entry, today))
            .collect(),
    )
}

/// Create a new tariff; it becomes the active one
pub async fn create_price(
    State(console): State<SharedConsole>,
    Json(payload): Json<PriceInput>,
) -> impl IntoResponse {
    let mut console = console.lock().unwrap();
    let today = today();
    match console.prices.create(payload, today) {
        Ok(entry) => (
            StatusCode::CREATED,
            Json(PriceResponse {
                price: PriceView::from_entry(&entry, today),
            }),
        )
            .into_response(),
        Err(error) => pricing_error_to_response(error).into_response(),
    }
}

/// Edit a tariff's amounts and validity window
pub async fn update_price(
    State(console): State<SharedConsole>,
    Path(price_id): Path<u32>,
    Json(payload): Json<PriceInput>,
) -> impl IntoResponse {
    let mut console = console.lock().unwrap();
    let today = today();
    match console.prices.update(price_id, payload, today) {
        Ok(entry) => (
            StatusCode::OK,
            Json(PriceResponse {
                price: PriceView::from_entry(&entry, today),
            }),
        )
            .into_response(),
        Err(error) => pricing_error_to_response(error).into_response(),
    }
}

/// Make a tariff the single active one
pub async fn activate_price(
    State(console): State<SharedConsole>,
    Path(price_id): Path<u32>,
) -> impl IntoResponse {
    let mut console = console.lock().unwrap();
    let today = today();
    match console.prices.activate(price_id, today) {
        Ok(entry) => (
            StatusCode::OK,
            Json(PriceResponse {
                price: PriceView::from_entry(&entry, today),
            }),
        )
            .into_response(),
        Err(error) => pricing_error_to_response(error).into_response(),
    }
}
