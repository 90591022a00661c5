//! Client for the upstream data API.
//!
//! The upstream serves three loosely-typed JSON array collections; records
//! go straight through the normalizer, which drops malformed ones with a
//! warning instead of failing the load.

use emove_core::{Customer, PriceEntry, Station, normalize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("GET {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("GET {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("GET {url} did not return a JSON array")]
    Shape { url: String },
}

/// One consistent load of everything the console mirrors from upstream.
#[derive(Debug)]
pub struct Snapshot {
    pub stations: Vec<Station>,
    pub customers: Vec<Customer>,
    pub prices: Vec<PriceEntry>,
}

#[derive(Clone)]
pub struct RemoteApi {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        RemoteApi {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_collection(&self, path: &str) -> Result<Vec<Value>, RemoteError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::info!("Loading {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| RemoteError::Request {
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status { url, status });
        }
        let body: Value = response.json().await.map_err(|source| RemoteError::Request {
            url: url.clone(),
            source,
        })?;
        match body {
            Value::Array(records) => Ok(records),
            _ => Err(RemoteError::Shape { url }),
        }
    }

    pub async fn fetch_stations(&self) -> Result<Vec<Station>, RemoteError> {
        let raws = self.fetch_collection("/api/stations").await?;
        Ok(normalize::stations(&raws))
    }

    pub async fn fetch_customers(&self) -> Result<Vec<Customer>, RemoteError> {
        let raws = self.fetch_collection("/api/customers").await?;
        Ok(normalize::customers(&raws))
    }

    pub async fn fetch_prices(&self) -> Result<Vec<PriceEntry>, RemoteError> {
        let raws = self.fetch_collection("/api/pricetable").await?;
        Ok(normalize::prices(&raws))
    }

    pub async fn fetch_snapshot(&self) -> Result<Snapshot, RemoteError> {
        let stations = self.fetch_stations().await?;
        let customers = self.fetch_customers().await?;
        let prices = self.fetch_prices().await?;
        Ok(Snapshot {
            stations,
            customers,
            prices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_snapshot_normalizes_all_collections() {
        let server = MockServer::start();

        let stations_mock = server.mock(|when, then| {
            when.method(GET).path("/api/stations");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    { "chargingStationId": 7, "chargingStationName": "X" },
                    { "id": "3", "name": "Mall Central", "address": "5 Ring Rd" }
                ]));
        });
        let customers_mock = server.mock(|when, then| {
            when.method(GET).path("/api/customers");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    { "customerId": 1, "customerName": "An Nguyen" },
                    { "noIdHere": true }
                ]));
        });
        let prices_mock = server.mock(|when, then| {
            when.method(GET).path("/api/pricetable");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {
                        "id": 1,
                        "pricePerKWh": 3858,
                        "penaltyFeePerMinute": 1000,
                        "validFrom": "2024-03-19T00:00:00",
                        "validTo": "2025-12-31T00:00:00",
                        "status": 1
                    }
                ]));
        });

        let remote = RemoteApi::new(server.base_url());
        let snapshot = remote.fetch_snapshot().await.unwrap();

        stations_mock.assert();
        customers_mock.assert();
        prices_mock.assert();

        assert_eq!(snapshot.stations.len(), 2);
        assert_eq!(snapshot.stations[0].id, 7);
        assert_eq!(snapshot.stations[0].location, "Unknown Location");
        assert_eq!(snapshot.stations[1].id, 3);
        assert_eq!(snapshot.stations[1].location, "5 Ring Rd");
        // The record with no derivable id was skipped, not fatal.
        assert_eq!(snapshot.customers.len(), 1);
        assert_eq!(snapshot.prices.len(), 1);
        assert_eq!(snapshot.prices[0].price_per_kwh, 3858.0);
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/stations");
            then.status(502);
        });

        let remote = RemoteApi::new(server.base_url());
        match remote.fetch_stations().await {
            Err(RemoteError::Status { status, .. }) => assert_eq!(status.as_u16(), 502),
            other => panic!("Expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_array_body_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/pricetable");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({ "unexpected": "object" }));
        });

        let remote = RemoteApi::new(server.base_url());
        assert!(matches!(
            remote.fetch_prices().await,
            Err(RemoteError::Shape { .. })
        ));
    }
}
