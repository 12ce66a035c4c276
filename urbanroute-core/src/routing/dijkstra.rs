use std::collections::BinaryHeap;

use hashbrown::HashMap;
use log::debug;
use petgraph::graph::NodeIndex;

use super::path::RoutePath;
use super::query::RouteQuery;
use super::search::label_search;
use super::state::State;
use super::weights::{EdgeFilter, edge_weight};
use crate::model::{NetworkGraph, TimePeriod, TrafficTable, TransportMode};
use crate::{Meters, QueryError};

/// Fastest single-mode route for a validated query.
///
/// # Errors
///
/// Returns a [`QueryError`] if the query is rejected. An unreachable
/// destination is not an error: the returned path is empty.
pub fn shortest_path(
    network: &NetworkGraph,
    traffic: &TrafficTable,
    query: &RouteQuery,
) -> Result<RoutePath, QueryError> {
    let validated = query.validate(network)?;
    let path = dijkstra(
        network,
        traffic,
        validated.start,
        validated.end,
        validated.mode,
        validated.period,
        EdgeFilter::NONE,
    );
    debug!(
        "{} route {} -> {} ({}): {} hops, {:.1} min",
        query.mode,
        query.from,
        query.to,
        validated.period,
        path.hop_count(),
        path.travel_time
    );
    Ok(path)
}

/// Traffic-aware Dijkstra between two nodes in a single mode.
///
/// Callers are expected to have validated the endpoints.
pub fn dijkstra(
    network: &NetworkGraph,
    traffic: &TrafficTable,
    start: NodeIndex,
    end: NodeIndex,
    mode: TransportMode,
    period: TimePeriod,
    filter: EdgeFilter,
) -> RoutePath {
    label_search(
        network,
        start,
        end,
        |edge, from, _| {
            if !filter.admits(network.link(edge)) {
                return None;
            }
            edge_weight(network, traffic, edge, from, mode, period).map(|w| (w, mode))
        },
        |_| 0.0,
    )
}

/// Shortest road distance in meters from `start` to every reachable node,
/// over links of any type. Stops early once `target` is settled.
pub fn road_distances(
    network: &NetworkGraph,
    start: NodeIndex,
    target: Option<NodeIndex>,
) -> HashMap<NodeIndex, Meters> {
    let mut distances: HashMap<NodeIndex, Meters> = HashMap::new();
    let mut heap = BinaryHeap::new();

    // Start node has distance 0
    heap.push(State {
        priority: 0.0,
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node, .. }) = heap.pop() {
        if target == Some(node) {
            break;
        }

        if distances.get(&node).is_some_and(|&best| cost > best) {
            continue;
        }

        for (_, next, link) in network.incident_links(node) {
            let next_cost = cost + link.distance;
            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        priority: next_cost,
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            priority: next_cost,
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    distances
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::Link;
    use crate::model::network::tests::place;

    /// Square A-B-C-D with a slow diagonal and a bus-only spur to E.
    pub(crate) fn sample_network() -> NetworkGraph {
        let mut network = NetworkGraph::new();
        let a = network.add_place(place("A", 31.00, 30.00));
        let b = network.add_place(place("B", 31.05, 30.00));
        let c = network.add_place(place("C", 31.05, 30.05));
        let d = network.add_place(place("D", 31.00, 30.05));
        let e = network.add_place(place("E", 31.10, 30.05));
        network.add_link(a, b, Link::road(5000.0, 2000.0, 7.0));
        network.add_link(b, c, Link::road(5000.0, 2000.0, 7.0));
        network.add_link(c, d, Link::road(5000.0, 2000.0, 7.0));
        network.add_link(d, a, Link::road(5000.0, 2000.0, 7.0));
        network.add_link(a, c, Link::potential(9000.0, 1000.0, 40.0));
        network.add_link(c, e, Link::bus(4000.0, 500.0, "B1", 6));
        network.mark_bus_stop(c);
        network.mark_bus_stop(e);
        network.rebuild_spatial_index();
        network
    }

    #[test]
    fn travel_time_is_sum_of_edge_weights() {
        let network = sample_network();
        let mut traffic = TrafficTable::new();
        traffic.set_flow(TimePeriod::Morning, "A", "C", 1500.0);
        traffic.set_flow(TimePeriod::Morning, "A", "B", 2600.0);

        for (from, to) in [("A", "C"), ("C", "A"), ("B", "D"), ("D", "B")] {
            let query = RouteQuery::new(from, to, TransportMode::Car, TimePeriod::Morning);
            let path = shortest_path(&network, &traffic, &query).unwrap();
            assert!(!path.is_empty());
            let recomputed = path
                .recomputed_travel_time(&network, &traffic, TimePeriod::Morning)
                .unwrap();
            assert!((path.travel_time - recomputed).abs() < 1e-9);
            let distance: f64 = path.edges.iter().map(|&e| network.link(e).distance).sum();
            assert!((path.distance - distance).abs() < 1e-9);
            assert_eq!(path.nodes.first().map(String::as_str), Some(from));
            assert_eq!(path.nodes.last().map(String::as_str), Some(to));
        }
    }

    #[test]
    fn congestion_changes_the_route() {
        let network = sample_network();
        let free = TrafficTable::new();
        let query = RouteQuery::new("A", "C", TransportMode::Car, TimePeriod::Morning);
        let direct = shortest_path(&network, &free, &query).unwrap();
        assert_eq!(direct.nodes, vec!["A", "C"]);

        let mut jammed = TrafficTable::new();
        jammed.set_flow(TimePeriod::Morning, "A", "C", 1500.0);
        let detour = shortest_path(&network, &jammed, &query).unwrap();
        assert_eq!(detour.hop_count(), 2);
        assert!((detour.distance - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn bus_only_link_is_a_bus_route_not_a_car_route() {
        let mut network = NetworkGraph::new();
        let a = network.add_place(place("A", 31.0, 30.0));
        let b = network.add_place(place("B", 31.01, 30.0));
        let bus_only = network.add_link(a, b, Link::bus(1000.0, 100.0, "B1", 3));
        network.mark_bus_stop(a);
        network.mark_bus_stop(b);
        let traffic = TrafficTable::new();

        let car = shortest_path(
            &network,
            &traffic,
            &RouteQuery::new("A", "B", TransportMode::Car, TimePeriod::Night),
        )
        .unwrap();
        assert!(car.is_empty());
        assert_eq!(car.distance, 0.0);
        assert_eq!(car.travel_time, 0.0);

        let bus = shortest_path(
            &network,
            &traffic,
            &RouteQuery::new("A", "B", TransportMode::Bus, TimePeriod::Night),
        )
        .unwrap();
        assert_eq!(bus.nodes, vec!["A", "B"]);
        assert_eq!(bus.edges, vec![bus_only]);
        assert_eq!(bus.modes, vec![TransportMode::Bus]);
    }

    #[test]
    fn unreachable_destination_yields_empty_path() {
        let mut network = sample_network();
        network.add_place(place("Z", 32.0, 31.0));
        let query = RouteQuery::new("A", "Z", TransportMode::Car, TimePeriod::Night);
        let path = shortest_path(&network, &TrafficTable::new(), &query).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn planner_filter_excludes_long_links() {
        let mut network = NetworkGraph::new();
        let a = network.add_place(place("A", 31.0, 30.0));
        let b = network.add_place(place("B", 31.6, 30.0));
        network.add_link(a, b, Link::road(60_000.0, 2000.0, 7.0));
        let traffic = TrafficTable::new();
        let plain = dijkstra(
            &network,
            &traffic,
            a,
            b,
            TransportMode::Car,
            TimePeriod::Night,
            EdgeFilter::NONE,
        );
        let planned = dijkstra(
            &network,
            &traffic,
            a,
            b,
            TransportMode::Car,
            TimePeriod::Night,
            EdgeFilter::PATH_PLANNER,
        );
        assert!(!plain.is_empty());
        assert!(planned.is_empty());
    }

    #[test]
    fn road_distances_cover_all_link_types() {
        let network = sample_network();
        let a = network.node("A").unwrap();
        let e = network.node("E").unwrap();
        let distances = road_distances(&network, a, None);
        assert_eq!(distances.len(), network.node_count());
        assert!((distances[&e] - 13_000.0).abs() < 1e-9);
        assert_eq!(distances[&a], 0.0);
    }
}
