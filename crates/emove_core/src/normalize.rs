//! Schema normalization for raw upstream records.
//!
//! The data API has gone through several naming conventions (camelCase,
//! lowercase, PascalCase, plus domain synonyms) without a schema version,
//! so every canonical field is resolved through an ordered alias table.
//! The first *defined* value wins; `0`, `""` and `false` are defined,
//! only JSON `null` and absent keys are skipped. New aliases are a data
//! change here, never a code change elsewhere.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;

use crate::models::{
    ChargingSession, Connector, Customer, Point, Port, PortStatus, PriceEntry, PriceStatus,
    Station, Vehicle,
};

#[derive(Error, Debug, PartialEq)]
pub enum NormalizeError {
    #[error("{entity} record has no {field} under any known alias")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
}

/// Ordered alias tables, one per canonical field. Order matters: earlier
/// names are the ones current API responses use.
mod alias {
    pub const STATION_ID: &[&str] = &[
        "stationid",
        "id",
        "stationId",
        "chargingStationId",
        "station_id",
    ];
    pub const STATION_NAME: &[&str] =
        &["stationname", "name", "stationName", "chargingStationName"];
    pub const STATION_LOCATION: &[&str] = &["location", "address", "fullAddress"];
    pub const STATION_LATITUDE: &[&str] = &["latitude", "lat"];
    pub const STATION_LONGITUDE: &[&str] = &["longitude", "lng", "long"];
    pub const STATION_POINTS: &[&str] = &["points"];

    pub const POINT_ID: &[&str] = &["id", "pointId", "point"];
    pub const POINT_PORTS: &[&str] = &["ports"];

    pub const PORT_ID: &[&str] = &["id", "portId"];
    pub const PORT_CONNECTOR: &[&str] = &["connectorName", "connector"];
    pub const PORT_POWER: &[&str] = &["power"];
    pub const PORT_STATUS: &[&str] = &["status"];

    pub const PRICE_ID: &[&str] = &["id", "priceid", "priceId", "PriceID"];
    pub const PRICE_PER_KWH: &[&str] =
        &["pricePerKWh", "priceperkwh", "pricePerKwh", "PricePerKWh"];
    pub const PRICE_PENALTY: &[&str] = &[
        "penaltyFeePerMinute",
        "penaltyfeeperminute",
        "PenaltyFeePerMinute",
    ];
    pub const PRICE_VALID_FROM: &[&str] = &["validFrom", "validfrom", "ValidFrom"];
    pub const PRICE_VALID_TO: &[&str] = &["validTo", "validto", "ValidTo"];
    pub const PRICE_STATUS: &[&str] = &["status", "Status"];

    pub const CUSTOMER_ID: &[&str] = &["customerId", "id", "customerID"];
    pub const CUSTOMER_NAME: &[&str] = &["customerName", "name", "fullName"];
    pub const CUSTOMER_FIRST_NAME: &[&str] = &["firstName"];
    pub const CUSTOMER_LAST_NAME: &[&str] = &["lastName"];
    pub const CUSTOMER_EMAIL: &[&str] = &["email", "emailAddress"];
    pub const CUSTOMER_PHONE: &[&str] = &["phoneNumber", "phone", "mobile"];
    pub const CUSTOMER_ADDRESS: &[&str] = &["address", "fullAddress"];

    pub const VEHICLE_ID: &[&str] = &["id", "Id", "ID", "vehicleId", "VehicleId", "VehicleID"];
    pub const VEHICLE_NAME: &[&str] = &["name", "Name", "vehicleName", "VehicleName"];
    pub const VEHICLE_PLATE: &[&str] = &["licensePlate", "LicensePlate", "licenseplate"];

    pub const SESSION_STATION_ID: &[&str] = &["stationId", "StationId", "StationID"];
    pub const SESSION_VEHICLE_ID: &[&str] = &["vehicleId", "VehicleId", "VehicleID"];
    pub const SESSION_STATUS: &[&str] = &["status", "Status"];
    pub const SESSION_ENERGY: &[&str] = &["energyConsumed", "EnergyConsumed"];
    pub const SESSION_COST: &[&str] = &["totalCost", "TotalCost"];
    pub const SESSION_START: &[&str] = &["startTime", "StartTime"];
    pub const SESSION_END: &[&str] = &["endTime", "EndTime"];
}

/// First defined value under any alias, in table order.
fn resolve<'a>(raw: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    let map = raw.as_object()?;
    aliases
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|v| !v.is_null())
}

// IDs arrive as either numbers or numeric strings depending on the API
// layer; coercion happens exactly once, here.
fn as_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_datetime(v: &Value) -> Option<NaiveDateTime> {
    let s = v.as_str()?.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Dates are truncated to day granularity; the upstream sends both plain
/// dates and midnight timestamps.
fn as_date(v: &Value) -> Option<NaiveDate> {
    as_datetime(v).map(|dt| dt.date())
}

fn as_port_status(v: &Value) -> Option<PortStatus> {
    match v.as_str()? {
        "InUse" => Some(PortStatus::InUse),
        "Faulty" => Some(PortStatus::Faulty),
        "Maintenance" => Some(PortStatus::Maintenance),
        _ => None,
    }
}

// The price API serves status as 0/1 in some responses and
// "Active"/"Deactive" in others.
fn as_price_status(v: &Value) -> Option<PriceStatus> {
    match v {
        Value::Number(n) => Some(if n.as_i64() == Some(1) {
            PriceStatus::Active
        } else {
            PriceStatus::Deactive
        }),
        Value::Bool(b) => Some(if *b {
            PriceStatus::Active
        } else {
            PriceStatus::Deactive
        }),
        Value::String(s) => Some(if s == "Active" || s == "1" {
            PriceStatus::Active
        } else {
            PriceStatus::Deactive
        }),
        _ => None,
    }
}

pub fn station(raw: &Value) -> Result<Station, NormalizeError> {
    let id = resolve(raw, alias::STATION_ID)
        .and_then(as_u32)
        .ok_or(NormalizeError::MissingField {
            entity: "station",
            field: "id",
        })?;
    let name = resolve(raw, alias::STATION_NAME)
        .and_then(as_string)
        .unwrap_or_else(|| "Unknown Station".to_string());
    let location = resolve(raw, alias::STATION_LOCATION)
        .and_then(as_string)
        .unwrap_or_else(|| "Unknown Location".to_string());
    let latitude = resolve(raw, alias::STATION_LATITUDE)
        .and_then(as_f64)
        .unwrap_or(0.0);
    let longitude = resolve(raw, alias::STATION_LONGITUDE)
        .and_then(as_f64)
        .unwrap_or(0.0);
    let points = resolve(raw, alias::STATION_POINTS)
        .and_then(Value::as_array)
        .map(|raws| points(raws))
        .unwrap_or_default();

    Ok(Station {
        id,
        name,
        location,
        latitude,
        longitude,
        points,
    })
}

pub fn point(raw: &Value) -> Result<Point, NormalizeError> {
    let id = resolve(raw, alias::POINT_ID)
        .and_then(as_string)
        .ok_or(NormalizeError::MissingField {
            entity: "point",
            field: "id",
        })?;
    let ports = resolve(raw, alias::POINT_PORTS)
        .and_then(Value::as_array)
        .map(|raws| ports(raws))
        .unwrap_or_default();

    Ok(Point { id, ports })
}

pub fn port(raw: &Value) -> Result<Port, NormalizeError> {
    let id = resolve(raw, alias::PORT_ID)
        .and_then(as_string)
        .ok_or(NormalizeError::MissingField {
            entity: "port",
            field: "id",
        })?;
    let connector = resolve(raw, alias::PORT_CONNECTOR)
        .and_then(as_string)
        .map(Connector::from)
        .unwrap_or(Connector::Other(String::new()));
    let power = resolve(raw, alias::PORT_POWER)
        .and_then(as_u32)
        .unwrap_or(0);
    let status = resolve(raw, alias::PORT_STATUS)
        .and_then(as_port_status)
        .unwrap_or(PortStatus::Maintenance);

    Ok(Port {
        id,
        connector,
        power,
        status,
    })
}

pub fn price(raw: &Value) -> Result<PriceEntry, NormalizeError> {
    let id = resolve(raw, alias::PRICE_ID)
        .and_then(as_u32)
        .ok_or(NormalizeError::MissingField {
            entity: "price",
            field: "id",
        })?;
    let price_per_kwh = resolve(raw, alias::PRICE_PER_KWH)
        .and_then(as_f64)
        .unwrap_or(0.0);
    let penalty_fee_per_minute = resolve(raw, alias::PRICE_PENALTY)
        .and_then(as_f64)
        .unwrap_or(0.0);
    let valid_from = resolve(raw, alias::PRICE_VALID_FROM)
        .and_then(as_date)
        .ok_or(NormalizeError::MissingField {
            entity: "price",
            field: "validFrom",
        })?;
    let valid_to = resolve(raw, alias::PRICE_VALID_TO)
        .and_then(as_date)
        .ok_or(NormalizeError::MissingField {
            entity: "price",
            field: "validTo",
        })?;
    let status = resolve(raw, alias::PRICE_STATUS)
        .and_then(as_price_status)
        .unwrap_or(PriceStatus::Deactive);

    Ok(PriceEntry {
        id,
        price_per_kwh,
        penalty_fee_per_minute,
        valid_from,
        valid_to,
        status,
    })
}

pub fn customer(raw: &Value) -> Result<Customer, NormalizeError> {
    let id = resolve(raw, alias::CUSTOMER_ID)
        .and_then(as_u32)
        .ok_or(NormalizeError::MissingField {
            entity: "customer",
            field: "id",
        })?;
    // Older responses only carry firstName/lastName.
    let name = resolve(raw, alias::CUSTOMER_NAME)
        .and_then(as_string)
        .or_else(|| {
            let first = resolve(raw, alias::CUSTOMER_FIRST_NAME).and_then(as_string);
            let last = resolve(raw, alias::CUSTOMER_LAST_NAME).and_then(as_string);
            match (first, last) {
                (None, None) => None,
                (first, last) => {
                    let full = format!(
                        "{} {}",
                        first.unwrap_or_default(),
                        last.unwrap_or_default()
                    );
                    let full = full.trim().to_string();
                    (!full.is_empty()).then_some(full)
                }
            }
        })
        .unwrap_or_else(|| "N/A".to_string());
    let email = resolve(raw, alias::CUSTOMER_EMAIL)
        .and_then(as_string)
        .unwrap_or_else(|| "N/A".to_string());
    let phone = resolve(raw, alias::CUSTOMER_PHONE)
        .and_then(as_string)
        .unwrap_or_else(|| "N/A".to_string());
    let address = resolve(raw, alias::CUSTOMER_ADDRESS)
        .and_then(as_string)
        .unwrap_or_else(|| "N/A".to_string());

    Ok(Customer {
        id,
        name,
        email,
        phone,
        address,
    })
}

pub fn vehicle(raw: &Value) -> Result<Vehicle, NormalizeError> {
    let id = resolve(raw, alias::VEHICLE_ID)
        .and_then(as_u32)
        .ok_or(NormalizeError::MissingField {
            entity: "vehicle",
            field: "id",
        })?;
    let name = resolve(raw, alias::VEHICLE_NAME)
        .and_then(as_string)
        .unwrap_or_else(|| "Unknown Vehicle".to_string());
    let license_plate = resolve(raw, alias::VEHICLE_PLATE)
        .and_then(as_string)
        .unwrap_or_else(|| "N/A".to_string());

    Ok(Vehicle {
        id,
        name,
        license_plate,
    })
}

pub fn session(raw: &Value) -> Result<ChargingSession, NormalizeError> {
    let station_id = resolve(raw, alias::SESSION_STATION_ID)
        .and_then(as_u32)
        .ok_or(NormalizeError::MissingField {
            entity: "session",
            field: "stationId",
        })?;
    let vehicle_id = resolve(raw, alias::SESSION_VEHICLE_ID).and_then(as_u32);
    let status = resolve(raw, alias::SESSION_STATUS)
        .and_then(as_string)
        .unwrap_or_default();
    let energy_consumed = resolve(raw, alias::SESSION_ENERGY)
        .and_then(as_f64)
        .unwrap_or(0.0);
    let total_cost = resolve(raw, alias::SESSION_COST)
        .and_then(as_f64)
        .unwrap_or(0.0);
    let start_time = resolve(raw, alias::SESSION_START).and_then(as_datetime);
    let end_time = resolve(raw, alias::SESSION_END).and_then(as_datetime);

    Ok(ChargingSession {
        station_id,
        vehicle_id,
        status,
        energy_consumed,
        total_cost,
        start_time,
        end_time,
    })
}

// Batch normalization: one malformed record never blocks the rest of a
// collection from loading.
macro_rules! batch {
    ($name:ident, $one:ident, $out:ty) => {
        pub fn $name(raws: &[Value]) -> Vec<$out> {
            raws.iter()
                .filter_map(|raw| match $one(raw) {
                    Ok(entity) => Some(entity),
                    Err(err) => {
                        tracing::warn!("skipping record: {err}");
                        None
                    }
                })
                .collect()
        }
    };
}

batch!(stations, station, Station);
batch!(points, point, Point);
batch!(ports, port, Port);
batch!(prices, price, PriceEntry);
batch!(customers, customer, Customer);
batch!(vehicles, vehicle, Vehicle);
batch!(sessions, session, ChargingSession);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_station_legacy_field_names() {
        let raw = json!({ "chargingStationId": 7, "chargingStationName": "X" });
        let station = station(&raw).unwrap();
        assert_eq!(station.id, 7);
        assert_eq!(station.name, "X");
        assert_eq!(station.location, "Unknown Location");
        assert_eq!(station.latitude, 0.0);
        assert_eq!(station.longitude, 0.0);
        assert!(station.points.is_empty());
    }

    #[test]
    fn test_station_id_accepts_numeric_string() {
        let raw = json!({ "id": "3", "name": "Mall Central" });
        assert_eq!(station(&raw).unwrap().id, 3);
    }

    #[test]
    fn test_station_alias_order_first_defined_wins() {
        // "stationid" precedes "id" in the table.
        let raw = json!({ "stationid": 4, "id": 9, "name": "A" });
        assert_eq!(station(&raw).unwrap().id, 4);
        // null does not count as defined, so resolution falls through.
        let raw = json!({ "stationid": null, "id": 9, "name": "A" });
        assert_eq!(station(&raw).unwrap().id, 9);
    }

    #[test]
    fn test_zero_and_empty_string_count_as_defined() {
        let raw = json!({ "id": 1, "name": "", "latitude": 0, "lat": 55.5 });
        let station = station(&raw).unwrap();
        assert_eq!(station.name, "");
        assert_eq!(station.latitude, 0.0);
    }

    #[test]
    fn test_station_missing_id_fails() {
        let raw = json!({ "name": "No Identity" });
        let err = station(&raw).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::MissingField {
                entity: "station",
                field: "id"
            }
        );
    }

    #[test]
    fn test_nested_points_and_ports() {
        let raw = json!({
            "id": 2,
            "name": "Airport Hub",
            "points": [
                {
                    "pointId": "2.1",
                    "ports": [
                        { "portId": "2.1.1", "connectorName": "AC", "power": 22, "status": "InUse" },
                        { "id": "2.1.2", "connector": "CHAdeMO" }
                    ]
                }
            ]
        });
        let station = station(&raw).unwrap();
        assert_eq!(station.points.len(), 1);
        let point = &station.points[0];
        assert_eq!(point.id, "2.1");
        assert_eq!(point.ports.len(), 2);
        assert_eq!(point.ports[0].connector, Connector::Ac);
        assert_eq!(point.ports[0].power, 22);
        assert_eq!(point.ports[0].status, PortStatus::InUse);
        // Defaults for the sparse port record.
        assert_eq!(point.ports[1].connector, Connector::Chademo);
        assert_eq!(point.ports[1].power, 0);
        assert_eq!(point.ports[1].status, PortStatus::Maintenance);
    }

    #[test]
    fn test_price_status_numeric_and_string() {
        let raw = json!({
            "priceId": 1,
            "PricePerKWh": 3858,
            "penaltyfeeperminute": 1000,
            "validfrom": "2024-03-19T00:00:00",
            "ValidTo": "2025-12-31",
            "status": 1
        });
        let entry = price(&raw).unwrap();
        assert_eq!(entry.id, 1);
        assert_eq!(entry.price_per_kwh, 3858.0);
        assert_eq!(entry.penalty_fee_per_minute, 1000.0);
        assert_eq!(
            entry.valid_from,
            NaiveDate::from_ymd_opt(2024, 3, 19).unwrap()
        );
        assert_eq!(entry.valid_to, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(entry.status, PriceStatus::Active);

        let raw = json!({
            "id": 2,
            "pricePerKWh": 4200,
            "validFrom": "2025-01-01T00:00:00",
            "validTo": "2025-06-30T00:00:00",
            "Status": "Deactive"
        });
        assert_eq!(price(&raw).unwrap().status, PriceStatus::Deactive);
    }

    #[test]
    fn test_customer_composed_name() {
        let raw = json!({
            "customerId": 12,
            "firstName": "An",
            "lastName": "Nguyen",
            "emailAddress": "an@example.com"
        });
        let customer = customer(&raw).unwrap();
        assert_eq!(customer.name, "An Nguyen");
        assert_eq!(customer.email, "an@example.com");
        assert_eq!(customer.phone, "N/A");
    }

    #[test]
    fn test_vehicle_defaults() {
        let raw = json!({ "VehicleID": 5 });
        let vehicle = vehicle(&raw).unwrap();
        assert_eq!(vehicle.id, 5);
        assert_eq!(vehicle.name, "Unknown Vehicle");
        assert_eq!(vehicle.license_plate, "N/A");
    }

    #[test]
    fn test_session_pascal_case_fields() {
        let raw = json!({
            "StationID": 3,
            "VehicleId": 8,
            "Status": "Completed",
            "EnergyConsumed": 41.5,
            "TotalCost": 12.2,
            "StartTime": "2025-05-01T10:00:00",
            "EndTime": "2025-05-01T11:30:00"
        });
        let session = session(&raw).unwrap();
        assert_eq!(session.station_id, 3);
        assert_eq!(session.vehicle_id, Some(8));
        assert_eq!(session.status, "Completed");
        assert_eq!(session.energy_consumed, 41.5);
        assert!(session.start_time.is_some());
    }

    #[test]
    fn test_batch_skips_malformed_records() {
        let raws = vec![
            json!({ "id": 1, "name": "Good" }),
            json!({ "name": "No id, skipped" }),
            json!("not even an object"),
            json!({ "stationId": "2" }),
        ];
        let stations = stations(&raws);
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].id, 1);
        assert_eq!(stations[1].id, 2);
        assert_eq!(stations[1].name, "Unknown Station");
    }
}
