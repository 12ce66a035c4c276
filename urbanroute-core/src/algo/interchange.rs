//! Candidate bus/metro transfer points.
//!
//! A bus stop and a metro station that lie close together but share no link
//! are scored by the passenger demand around them; short, busy gaps rank
//! first.

use petgraph::graph::NodeIndex;
use rayon::prelude::*;
use serde::Serialize;

use crate::loading::DemandRecord;
use crate::model::NetworkGraph;
use crate::Meters;

pub const DEFAULT_MAX_DISTANCE: Meters = 1000.0;
pub const DEFAULT_LIMIT: usize = 10;
/// Share of daily passengers assumed to transfer
const TRANSFER_SHARE: f64 = 0.1;
/// Keeps the score finite for co-located pairs
const DISTANCE_OFFSET: Meters = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interchange {
    pub bus_stop: String,
    pub metro_station: String,
    pub distance: Meters,
    /// Estimated daily transferring passengers
    pub demand: f64,
    pub score: f64,
}

fn transfer_demand(network: &NetworkGraph, demand: &[DemandRecord], a: NodeIndex, b: NodeIndex) -> f64 {
    let (a, b) = (network.place_id(a), network.place_id(b));
    let touches = |id: &str| id == a || id == b;
    demand
        .iter()
        .filter(|record| touches(&record.from_id) || touches(&record.to_id))
        .map(|record| record.daily_passengers)
        .sum::<f64>()
        * TRANSFER_SHARE
}

/// Ranks unconnected bus stop / metro station pairs within `max_distance`
/// meters of each other and returns the best `limit`.
pub fn recommend_interchanges(
    network: &NetworkGraph,
    demand: &[DemandRecord],
    max_distance: Meters,
    limit: usize,
) -> Vec<Interchange> {
    let bus_stops = network.bus_stops();
    let mut candidates: Vec<(NodeIndex, NodeIndex, Interchange)> = bus_stops
        .par_iter()
        .flat_map_iter(|&stop| {
            network
                .places_within(network.position(stop), max_distance)
                .into_iter()
                .filter(move |&(station, _)| {
                    station != stop
                        && network.is_metro_station(station)
                        && network.links_between(stop, station).next().is_none()
                })
                .map(move |(station, distance)| {
                    let demand = transfer_demand(network, demand, stop, station);
                    let interchange = Interchange {
                        bus_stop: network.place_id(stop).to_string(),
                        metro_station: network.place_id(station).to_string(),
                        distance,
                        demand,
                        score: demand / (distance + DISTANCE_OFFSET),
                    };
                    (stop, station, interchange)
                })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.2.score
            .total_cmp(&a.2.score)
            .then(a.0.cmp(&b.0))
            .then(a.1.cmp(&b.1))
    });
    log::debug!(
        "{} interchange candidates within {max_distance} m",
        candidates.len()
    );
    candidates
        .into_iter()
        .take(limit)
        .map(|(_, _, interchange)| interchange)
        .collect()
}
