use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::allocator;
use crate::models::{Point, Port, PortStatus, Station};
use crate::natsort;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("station {station_id} not found")]
    StationNotFound { station_id: u32 },
    #[error("point {point_id} not found in station {station_id}")]
    PointNotFound { station_id: u32, point_id: String },
    #[error("port {port_id} not found in point {point_id}")]
    PortNotFound { point_id: String, port_id: String },
}

/// Fields for an explicit station add; the ID is allocated by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStation {
    pub name: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Exclusive owner of the Station -> Point -> Port tree. All mutation goes
/// through these methods; there is no ambient shared collection.
#[derive(Debug, Default)]
pub struct EntityStore {
    stations: Vec<Station>,
}

impl EntityStore {
    pub fn new() -> Self {
        EntityStore::default()
    }

    /// Replace the whole tree with a freshly loaded snapshot. Points and
    /// ports are put into natural ID order once, here.
    pub fn replace_all(&mut self, mut stations: Vec<Station>) {
        for station in &mut stations {
            sort_tree(station);
        }
        self.stations = stations;
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn station(&self, station_id: u32) -> Result<&Station, StoreError> {
        self.stations
            .iter()
            .find(|s| s.id == station_id)
            .ok_or(StoreError::StationNotFound { station_id })
    }

    fn station_mut(&mut self, station_id: u32) -> Result<&mut Station, StoreError> {
        self.stations
            .iter_mut()
            .find(|s| s.id == station_id)
            .ok_or(StoreError::StationNotFound { station_id })
    }

    pub fn add_station(&mut self, fields: NewStation) -> Result<Station, StoreError> {
        tracing::info!("Adding station {:?}", fields.name);
        if fields.name.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        if fields.location.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "location",
                reason: "must not be empty".to_string(),
            });
        }
        if !fields.latitude.is_finite() {
            return Err(StoreError::Validation {
                field: "latitude",
                reason: "must be a finite number".to_string(),
            });
        }
        if !fields.longitude.is_finite() {
            return Err(StoreError::Validation {
                field: "longitude",
                reason: "must be a finite number".to_string(),
            });
        }

        let station = Station {
            id: allocator::next_station_id(&self.stations),
            name: fields.name.trim().to_string(),
            location: fields.location.trim().to_string(),
            latitude: fields.latitude,
            longitude: fields.longitude,
            points: Vec::new(),
        };
        self.stations.push(station.clone());
        Ok(station)
    }

    /// Removes a station and, with it, every point and port it owns.
    pub fn remove_station(&mut self, station_id: u32) -> Result<Station, StoreError> {
        tracing::info!("Removing station {}", station_id);
        let idx = self
            .stations
            .iter()
            .position(|s| s.id == station_id)
            .ok_or(StoreError::StationNotFound { station_id })?;
        Ok(self.stations.remove(idx))
    }

    pub fn add_point(&mut self, station_id: u32) -> Result<Point, StoreError> {
        tracing::info!("Adding point to station {}", station_id);
        let station = self.station_mut(station_id)?;
        let point = allocator::new_point(station);
        station.points.push(point.clone());
        Ok(point)
    }

    pub fn remove_point(&mut self, station_id: u32, point_id: &str) -> Result<(), StoreError> {
        tracing::info!("Removing point {} from station {}", point_id, station_id);
        let station = self.station_mut(station_id)?;
        let idx = station
            .points
            .iter()
            .position(|p| p.id == point_id)
            .ok_or_else(|| StoreError::PointNotFound {
                station_id,
                point_id: point_id.to_string(),
            })?;
        station.points.remove(idx);
        Ok(())
    }

    pub fn remove_port(
        &mut self,
        station_id: u32,
        point_id: &str,
        port_id: &str,
    ) -> Result<(), StoreError> {
        tracing::info!("Removing port {} from point {}", port_id, point_id);
        let point = self.point_mut(station_id, point_id)?;
        let idx = point
            .ports
            .iter()
            .position(|p| p.id == port_id)
            .ok_or_else(|| StoreError::PortNotFound {
                point_id: point_id.to_string(),
                port_id: port_id.to_string(),
            })?;
        point.ports.remove(idx);
        Ok(())
    }

    /// Edits a port's power rating and status. Unlike the creation default
    /// of 0, an explicit edit must land in [1,350] kW.
    pub fn update_port(
        &mut self,
        station_id: u32,
        point_id: &str,
        port_id: &str,
        power: u32,
        status: PortStatus,
    ) -> Result<Port, StoreError> {
        tracing::info!("Updating port {} of point {}", port_id, point_id);
        if !(1..=350).contains(&power) {
            return Err(StoreError::Validation {
                field: "power",
                reason: format!("must be between 1 and 350 kW, got {power}"),
            });
        }
        let point = self.point_mut(station_id, point_id)?;
        let port = point
            .ports
            .iter_mut()
            .find(|p| p.id == port_id)
            .ok_or_else(|| StoreError::PortNotFound {
                point_id: point_id.to_string(),
                port_id: port_id.to_string(),
            })?;
        port.power = power;
        port.status = status;
        Ok(port.clone())
    }

    fn point_mut(&mut self, station_id: u32, point_id: &str) -> Result<&mut Point, StoreError> {
        let station = self.station_mut(station_id)?;
        station
            .points
            .iter_mut()
            .find(|p| p.id == point_id)
            .ok_or_else(|| StoreError::PointNotFound {
                station_id,
                point_id: point_id.to_string(),
            })
    }
}

fn sort_tree(station: &mut Station) {
    station
        .points
        .sort_by(|a, b| natsort::compare(&a.id, &b.id));
    for point in &mut station.points {
        point.ports.sort_by(|a, b| natsort::compare(&a.id, &b.id));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::Connector;

    fn new_station_fields(name: &str) -> NewStation {
        NewStation {
            name: name.to_string(),
            location: "12 Main St".to_string(),
            latitude: 10.77,
            longitude: 106.69,
        }
    }

    fn seeded_store() -> EntityStore {
        let mut store = EntityStore::new();
        store.add_station(new_station_fields("Downtown Plaza")).unwrap();
        store.add_station(new_station_fields("Mall Central")).unwrap();
        store
    }

    #[test]
    fn test_add_station_allocates_sequential_ids() {
        let store = seeded_store();
        let ids: Vec<u32> = store.stations().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_add_station_validation() {
        let mut store = EntityStore::new();

        let result = store.add_station(NewStation {
            name: "  ".to_string(),
            ..new_station_fields("x")
        });
        match result {
            Err(StoreError::Validation { field, .. }) => assert_eq!(field, "name"),
            other => panic!("Expected name validation error, got {other:?}"),
        }

        let result = store.add_station(NewStation {
            latitude: f64::NAN,
            ..new_station_fields("Airport Hub")
        });
        match result {
            Err(StoreError::Validation { field, .. }) => assert_eq!(field, "latitude"),
            other => panic!("Expected latitude validation error, got {other:?}"),
        }

        // Failed adds must not mutate the store.
        assert!(store.stations().is_empty());
    }

    #[test]
    fn test_add_point_creates_three_templated_ports() {
        let mut store = seeded_store();
        let point = store.add_point(1).unwrap();
        assert_eq!(point.id, "1.1");
        assert_eq!(point.ports.len(), 3);
        assert_eq!(point.ports[0].connector, Connector::Ac);
        assert_eq!(point.ports[1].connector, Connector::Ccs);
        assert_eq!(point.ports[2].connector, Connector::Chademo);

        let point = store.add_point(1).unwrap();
        assert_eq!(point.id, "1.2");
    }

    #[test]
    fn test_add_point_unknown_station() {
        let mut store = seeded_store();
        match store.add_point(99) {
            Err(StoreError::StationNotFound { station_id }) => assert_eq!(station_id, 99),
            other => panic!("Expected StationNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_remove_station_cascades() {
        let mut store = seeded_store();
        store.add_point(1).unwrap();
        store.add_point(1).unwrap();

        let removed = store.remove_station(1).unwrap();
        assert_eq!(removed.points.len(), 2);

        assert!(matches!(
            store.station(1),
            Err(StoreError::StationNotFound { .. })
        ));
        assert!(matches!(
            store.remove_point(1, "1.1"),
            Err(StoreError::StationNotFound { .. })
        ));
        assert!(matches!(
            store.remove_port(1, "1.1", "1.1.1"),
            Err(StoreError::StationNotFound { .. })
        ));
        // The other station is untouched.
        assert!(store.station(2).is_ok());
    }

    #[test]
    fn test_remove_point_and_port() {
        let mut store = seeded_store();
        store.add_point(2).unwrap();

        store.remove_port(2, "2.1", "2.1.2").unwrap();
        let station = store.station(2).unwrap();
        assert_eq!(station.points[0].ports.len(), 2);

        assert!(matches!(
            store.remove_port(2, "2.1", "2.1.2"),
            Err(StoreError::PortNotFound { .. })
        ));

        store.remove_point(2, "2.1").unwrap();
        assert!(store.station(2).unwrap().points.is_empty());
        assert!(matches!(
            store.remove_point(2, "2.1"),
            Err(StoreError::PointNotFound { .. })
        ));
    }

    #[test]
    fn test_update_port_power_range() {
        let mut store = seeded_store();
        store.add_point(1).unwrap();

        let port = store
            .update_port(1, "1.1", "1.1.1", 22, PortStatus::InUse)
            .unwrap();
        assert_eq!(port.power, 22);
        assert_eq!(port.status, PortStatus::InUse);

        for bad_power in [0, 351] {
            match store.update_port(1, "1.1", "1.1.1", bad_power, PortStatus::Faulty) {
                Err(StoreError::Validation { field, .. }) => assert_eq!(field, "power"),
                other => panic!("Expected power validation error, got {other:?}"),
            }
        }
        // The rejected edits left the port as it was.
        let station = store.station(1).unwrap();
        assert_eq!(station.points[0].ports[0].power, 22);
        assert_eq!(station.points[0].ports[0].status, PortStatus::InUse);
    }

    #[test]
    fn test_replace_all_sorts_naturally() {
        let mut store = EntityStore::new();
        let station = Station {
            id: 1,
            name: "S".to_string(),
            location: "L".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            points: vec![
                Point {
                    id: "1.10".to_string(),
                    ports: vec![],
                },
                Point {
                    id: "1.2".to_string(),
                    ports: vec![],
                },
                Point {
                    id: "1.1".to_string(),
                    ports: vec![],
                },
            ],
        };
        store.replace_all(vec![station]);
        let ids: Vec<&str> = store.stations()[0]
            .points
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1.1", "1.2", "1.10"]);
    }
}
