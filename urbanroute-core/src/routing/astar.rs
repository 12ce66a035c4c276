//! A* search for emergency vehicles.
//!
//! The heuristic is the projected straight-line distance driven at
//! 100 km/h. Road links allow up to 120 km/h and light traffic speeds
//! vehicles up further, so the estimate can overshoot: results are good
//! routes, not guaranteed optimal ones.

use log::debug;
use petgraph::graph::NodeIndex;

use super::path::RoutePath;
use super::query::RouteQuery;
use super::search::label_search;
use super::weights::edge_weight;
use crate::model::geometry::planar_distance;
use crate::model::{NetworkGraph, TimePeriod, TrafficTable, TransportMode};
use crate::{Minutes, QueryError};

/// Speed assumed by the heuristic, km/h
const HEURISTIC_SPEED_KMH: f64 = 100.0;

/// Straight-line travel time estimate between two places.
pub fn heuristic_minutes(network: &NetworkGraph, node: NodeIndex, goal: NodeIndex) -> Minutes {
    let meters = planar_distance(network.position(node), network.position(goal));
    meters / 1000.0 / HEURISTIC_SPEED_KMH * 60.0
}

/// Emergency route between two places by id. One of the endpoints must be
/// a hospital or medical facility.
///
/// # Errors
///
/// Returns a [`QueryError`] if the endpoints are rejected or neither is a
/// medical facility
pub fn emergency_route(
    network: &NetworkGraph,
    traffic: &TrafficTable,
    from: &str,
    to: &str,
    period: TimePeriod,
) -> Result<RoutePath, QueryError> {
    let query = RouteQuery::new(from, to, TransportMode::Emergency, period);
    let validated = query.validate(network)?;
    if !network.is_medical_facility(validated.start) && !network.is_medical_facility(validated.end)
    {
        return Err(QueryError::NoMedicalEndpoint);
    }
    let path = astar_emergency(network, traffic, validated.start, validated.end, period);
    debug!(
        "Emergency route {from} -> {to} ({period}): {} hops, {:.1} min",
        path.hop_count(),
        path.travel_time
    );
    Ok(path)
}

/// A* in emergency mode between two nodes.
pub fn astar_emergency(
    network: &NetworkGraph,
    traffic: &TrafficTable,
    start: NodeIndex,
    end: NodeIndex,
    period: TimePeriod,
) -> RoutePath {
    label_search(
        network,
        start,
        end,
        |edge, from, _| {
            edge_weight(network, traffic, edge, from, TransportMode::Emergency, period)
                .map(|w| (w, TransportMode::Emergency))
        },
        |node| heuristic_minutes(network, node, end),
    )
}
