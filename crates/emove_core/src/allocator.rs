//! Hierarchical ID allocation.
//!
//! Stations and points grow dynamically (max sibling + 1); ports do not.
//! A new point always comes with the fixed three-port template
//! `.1`/`.2`/`.3` bound to AC/CCS/CHAdeMO, so there is no port allocator.

use crate::models::{Connector, Point, Port, PortStatus, Station};

/// Next free numeric station ID: 1 + highest existing, or 1 when the
/// network is empty.
pub fn next_station_id(stations: &[Station]) -> u32 {
    stations.iter().map(|s| s.id).max().map_or(1, |max| max + 1)
}

/// Next dotted point ID within a station. Sibling IDs with a malformed or
/// missing numeric suffix are skipped in the max computation, never an
/// allocation failure.
pub fn next_point_id(station: &Station) -> String {
    let max_suffix = station
        .points
        .iter()
        .filter_map(|p| p.id.split('.').nth(1).and_then(|n| n.parse::<u32>().ok()))
        .max()
        .unwrap_or(0);
    format!("{}.{}", station.id, max_suffix + 1)
}

/// The fixed port topology of a freshly created point. Power 0 is the
/// "unconfigured" sentinel until an operator edits the port.
pub fn template_ports(point_id: &str) -> Vec<Port> {
    [Connector::Ac, Connector::Ccs, Connector::Chademo]
        .into_iter()
        .enumerate()
        .map(|(i, connector)| Port {
            id: format!("{}.{}", point_id, i + 1),
            connector,
            power: 0,
            status: PortStatus::Maintenance,
        })
        .collect()
}

/// A new point with its templated ports.
pub fn new_point(station: &Station) -> Point {
    let id = next_point_id(station);
    let ports = template_ports(&id);
    Point { id, ports }
}
