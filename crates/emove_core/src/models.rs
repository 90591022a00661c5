use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A physical charging location, root of the entity hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub points: Vec<Point>,
}

/// A charging bay within a station. IDs are dotted: `"<stationId>.<n>"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub id: String,
    pub ports: Vec<Port>,
}

/// A single connector socket. IDs are dotted: `"<pointId>.<m>"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub id: String,
    pub connector: Connector,
    /// Power rating in kW. 0 means "not yet configured"; the [1,350]
    /// range is only enforced when a port is explicitly edited.
    pub power: u32,
    pub status: PortStatus,
}

/// Connector type. AC/CCS/CHAdeMO are canonical, but upstream records may
/// carry anything, so unknown names are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Connector {
    Ac,
    Ccs,
    Chademo,
    Other(String),
}

impl From<String> for Connector {
    fn from(s: String) -> Self {
        match s.as_str() {
            "AC" => Connector::Ac,
            "CCS" => Connector::Ccs,
            "CHAdeMO" => Connector::Chademo,
            _ => Connector::Other(s),
        }
    }
}

impl From<Connector> for String {
    fn from(c: Connector) -> Self {
        match c {
            Connector::Ac => "AC".to_string(),
            Connector::Ccs => "CCS".to_string(),
            Connector::Chademo => "CHAdeMO".to_string(),
            Connector::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortStatus {
    InUse,
    Faulty,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceStatus {
    Active,
    Deactive,
}

/// A time-bounded tariff entry of the price schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub id: u32,
    pub price_per_kwh: f64,
    pub penalty_fee_per_minute: f64,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub status: PriceStatus,
}

impl PriceEntry {
    /// Expiry is a day-granularity comparison, never stored.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.valid_to < today
    }

    /// Status as shown to callers: expired entries always read as Deactive,
    /// whatever their stored flag says.
    pub fn presented_status(&self, today: NaiveDate) -> PriceStatus {
        if self.is_expired(today) {
            PriceStatus::Deactive
        } else {
            self.status
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: u32,
    pub name: String,
    pub license_plate: String,
}

/// A charging session record from the reports feed. Sessions are read-only
/// inputs; the console never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingSession {
    pub station_id: u32,
    pub vehicle_id: Option<u32>,
    pub status: String,
    pub energy_consumed: f64,
    pub total_cost: f64,
    pub start_time: Option<chrono::NaiveDateTime>,
    pub end_time: Option<chrono::NaiveDateTime>,
}
