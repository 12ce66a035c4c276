//! Review of existing bus routes against passenger demand.
//!
//! For every route: its length over the network, the demand it already
//! carries between consecutive stops, and busy demand pairs close to the
//! route that it does not serve yet.

use std::collections::VecDeque;

use hashbrown::HashMap;
use petgraph::graph::NodeIndex;
use rayon::prelude::*;
use serde::Serialize;

use crate::loading::{BusRouteRecord, DemandRecord};
use crate::model::NetworkGraph;
use crate::routing::road_distances;
use crate::{Meters, PlaceId};

/// Pairs below this many daily passengers are never suggested
pub const HIGH_DEMAND_THRESHOLD: f64 = 1000.0;
pub const MAX_SUGGESTIONS: usize = 3;
/// A demand endpoint this many links from a stop counts as near the route
const NEARBY_HOPS: usize = 2;
/// Length charged for consecutive stops with no connection at all
const UNCONNECTED_SEGMENT_LENGTH: Meters = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandSuggestion {
    pub from: PlaceId,
    pub to: PlaceId,
    pub daily_passengers: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusRouteReview {
    pub route_id: String,
    pub stops: Vec<PlaceId>,
    pub buses_assigned: u32,
    pub daily_passengers: f64,
    /// Meters along the network between consecutive stops
    pub length: Meters,
    /// Daily passengers between consecutive stops, both directions
    pub demand_coverage: f64,
    pub suggested_additions: Vec<DemandSuggestion>,
}

/// Demand per ordered pair. A repeated pair keeps its last value and its
/// first position.
fn demand_table(demand: &[DemandRecord]) -> Vec<(&str, &str, f64)> {
    let mut position: HashMap<(&str, &str), usize> = HashMap::new();
    let mut table: Vec<(&str, &str, f64)> = Vec::new();
    for record in demand {
        let key = (record.from_id.as_str(), record.to_id.as_str());
        match position.get(&key) {
            Some(&index) => table[index].2 = record.daily_passengers,
            None => {
                position.insert(key, table.len());
                table.push((key.0, key.1, record.daily_passengers));
            }
        }
    }
    table
}

fn segment_length(network: &NetworkGraph, from: NodeIndex, to: NodeIndex) -> Meters {
    let direct = network
        .links_between(from, to)
        .map(|(_, link)| link.distance)
        .min_by(f64::total_cmp);
    if let Some(distance) = direct {
        return distance;
    }
    road_distances(network, from, Some(to))
        .get(&to)
        .copied()
        .unwrap_or(UNCONNECTED_SEGMENT_LENGTH)
}

/// Places at most `NEARBY_HOPS` links away from any of `stops`.
fn nearby_places(network: &NetworkGraph, stops: &[NodeIndex]) -> HashMap<NodeIndex, usize> {
    let mut depth: HashMap<NodeIndex, usize> = stops.iter().map(|&stop| (stop, 0)).collect();
    let mut queue: VecDeque<NodeIndex> = stops.iter().copied().collect();
    while let Some(node) = queue.pop_front() {
        let next_depth = depth[&node] + 1;
        if next_depth > NEARBY_HOPS {
            continue;
        }
        for (_, next, _) in network.incident_links(node) {
            if !depth.contains_key(&next) {
                depth.insert(next, next_depth);
                queue.push_back(next);
            }
        }
    }
    depth
}

fn review_route(
    network: &NetworkGraph,
    route: &BusRouteRecord,
    demand: &[(&str, &str, f64)],
) -> BusRouteReview {
    let stops = route.stop_ids();
    let pair_demand: HashMap<(&str, &str), f64> =
        demand.iter().map(|&(from, to, passengers)| ((from, to), passengers)).collect();

    let mut length = 0.0;
    let mut demand_coverage = 0.0;
    for pair in stops.windows(2) {
        let (from, to) = (pair[0].as_str(), pair[1].as_str());
        if let (Some(a), Some(b)) = (network.node(from), network.node(to)) {
            length += segment_length(network, a, b);
        }
        demand_coverage += pair_demand.get(&(from, to)).copied().unwrap_or(0.0)
            + pair_demand.get(&(to, from)).copied().unwrap_or(0.0);
    }

    let stop_nodes: Vec<NodeIndex> = stops.iter().filter_map(|id| network.node(id)).collect();
    let nearby = nearby_places(network, &stop_nodes);
    let near = |id: &str| network.node(id).is_some_and(|node| nearby.contains_key(&node));
    let on_route = |id: &str| stops.iter().any(|stop| stop == id);

    let mut candidates: Vec<DemandSuggestion> = demand
        .iter()
        .filter(|&&(from, to, passengers)| {
            passengers > HIGH_DEMAND_THRESHOLD
                && !on_route(from)
                && !on_route(to)
                && (near(from) || near(to))
        })
        .map(|&(from, to, passengers)| DemandSuggestion {
            from: from.to_string(),
            to: to.to_string(),
            daily_passengers: passengers,
        })
        .collect();
    candidates.sort_by(|a, b| b.daily_passengers.total_cmp(&a.daily_passengers));
    candidates.truncate(MAX_SUGGESTIONS);

    BusRouteReview {
        route_id: route.route_id.clone(),
        stops,
        buses_assigned: route.buses_assigned,
        daily_passengers: route.daily_passengers,
        length,
        demand_coverage,
        suggested_additions: candidates,
    }
}

/// Reviews every bus route, in input order.
pub fn analyze_bus_routes(
    network: &NetworkGraph,
    bus_routes: &[BusRouteRecord],
    demand: &[DemandRecord],
) -> Vec<BusRouteReview> {
    let table = demand_table(demand);
    let reviews: Vec<BusRouteReview> = bus_routes
        .par_iter()
        .map(|route| review_route(network, route, &table))
        .collect();
    log::info!(
        "Reviewed {} bus routes, {} suggested additions",
        reviews.len(),
        reviews
            .iter()
            .map(|review| review.suggested_additions.len())
            .sum::<usize>()
    );
    reviews
}
