//! Multi-modal search with transfer penalties, and side-by-side comparison
//! of every mode for one trip.

use log::debug;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use super::dijkstra::dijkstra;
use super::path::RoutePath;
use super::query::{RouteQuery, validate_endpoints};
use super::search::label_search;
use super::weights::{EdgeFilter, edge_weight};
use crate::model::{NetworkGraph, RoadType, TimePeriod, TrafficTable, TransportMode};
use crate::{Minutes, QueryError};

/// Minutes added whenever consecutive hops use different modes.
pub const MODE_SWITCH_PENALTY: Minutes = 5.0;

/// The mode a hop over a link of this type is taken in.
pub fn hop_mode(road_type: RoadType) -> TransportMode {
    match road_type {
        RoadType::Bus => TransportMode::Bus,
        RoadType::Metro => TransportMode::Metro,
        _ => TransportMode::Car,
    }
}

/// Mixed-mode route between two places by id. Any place may start or end a
/// mixed trip.
///
/// # Errors
///
/// Returns a [`QueryError`] if the endpoints are rejected
pub fn mixed_mode_route(
    network: &NetworkGraph,
    traffic: &TrafficTable,
    from: &str,
    to: &str,
    period: TimePeriod,
) -> Result<RoutePath, QueryError> {
    let validated = RouteQuery::new(from, to, TransportMode::Car, period).validate(network)?;
    let path = mixed_mode(network, traffic, validated.start, validated.end, period);
    debug!(
        "Mixed route {from} -> {to} ({period}): {} hops, {} switches, {:.1} min",
        path.hop_count(),
        path.mode_switches(),
        path.travel_time
    );
    Ok(path)
}

/// Dijkstra where every link is usable in the mode its type implies and the
/// label of each place remembers the mode it was reached in.
pub fn mixed_mode(
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
        |edge, from, arrival_mode| {
            let mode = hop_mode(network.link(edge).road_type);
            let mut weight = edge_weight(network, traffic, edge, from, mode, period)?;
            if arrival_mode.is_some_and(|previous| previous != mode) {
                weight += MODE_SWITCH_PENALTY;
            }
            Some((weight, mode))
        },
        |_| 0.0,
    )
}

/// Routes for one trip in every passenger mode.
#[derive(Debug, Clone, Serialize)]
pub struct ModeComparison {
    pub car: RoutePath,
    pub bus: RoutePath,
    pub metro: RoutePath,
    pub mixed: RoutePath,
}

impl ModeComparison {
    /// Fastest non-empty option, labelled by mode.
    pub fn fastest(&self) -> Option<(&'static str, &RoutePath)> {
        [
            ("car", &self.car),
            ("bus", &self.bus),
            ("metro", &self.metro),
            ("mixed", &self.mixed),
        ]
        .into_iter()
        .filter(|(_, path)| !path.is_empty())
        .min_by(|a, b| a.1.travel_time.total_cmp(&b.1.travel_time))
    }
}

/// Plans the trip by car, bus, metro and mixed mode. A mode that does not
/// serve both endpoints yields an empty path instead of an error.
///
/// # Errors
///
/// Returns a [`QueryError`] for identical or unknown endpoints
pub fn compare_modes(
    network: &NetworkGraph,
    traffic: &TrafficTable,
    from: &str,
    to: &str,
    period: TimePeriod,
) -> Result<ModeComparison, QueryError> {
    let validated = RouteQuery::new(from, to, TransportMode::Car, period).validate(network)?;
    let (start, end) = (validated.start, validated.end);

    let single = |mode: TransportMode| {
        if validate_endpoints(network, start, end, mode).is_ok() {
            dijkstra(network, traffic, start, end, mode, period, EdgeFilter::NONE)
        } else {
            RoutePath::unreachable()
        }
    };

    Ok(ModeComparison {
        car: single(TransportMode::Car),
        bus: single(TransportMode::Bus),
        metro: single(TransportMode::Metro),
        mixed: mixed_mode(network, traffic, start, end, period),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Link;
    use crate::model::network::tests::place;

    /// Road - metro - metro - road corridor next to a slow direct road.
    fn network() -> NetworkGraph {
        let mut network = NetworkGraph::new();
        let a = network.add_place(place("A", 31.00, 30.00));
        let b = network.add_place(place("B", 31.02, 30.00));
        let c = network.add_place(place("C", 31.10, 30.00));
        let d = network.add_place(place("D", 31.13, 30.00));
        network.add_link(a, b, Link::road(2000.0, 0.0, 8.0));
        network.add_link(b, c, Link::metro(9000.0, 3000.0, "M1"));
        network.add_link(c, d, Link::road(3000.0, 0.0, 8.0));
        network.add_link(a, d, Link::road(60_000.0, 0.0, 4.0));
        network.mark_metro_station(b);
        network.mark_metro_station(c);
        network
    }

    #[test]
    fn switching_modes_costs_five_minutes_each() {
        let network = network();
        let traffic = TrafficTable::new();
        let path = mixed_mode_route(&network, &traffic, "A", "D", TimePeriod::Morning).unwrap();
        assert_eq!(path.nodes, vec!["A", "B", "C", "D"]);
        assert_eq!(
            path.modes,
            vec![TransportMode::Car, TransportMode::Metro, TransportMode::Car]
        );
        assert_eq!(path.mode_switches(), 2);
        assert!((path.travel_time - 18.5).abs() < 1e-9);
        let recomputed = path
            .recomputed_travel_time(&network, &traffic, TimePeriod::Morning)
            .unwrap();
        assert!((path.travel_time - recomputed).abs() < 1e-9);
    }

    #[test]
    fn no_penalty_on_the_first_hop() {
        let network = network();
        let path =
            mixed_mode_route(&network, &TrafficTable::new(), "B", "D", TimePeriod::Night).unwrap();
        assert_eq!(path.modes, vec![TransportMode::Metro, TransportMode::Car]);
        assert!((path.travel_time - 12.5).abs() < 1e-9);
    }

    #[test]
    fn comparison_reports_each_mode() {
        let network = network();
        let comparison =
            compare_modes(&network, &TrafficTable::new(), "A", "D", TimePeriod::Morning).unwrap();
        assert_eq!(comparison.car.nodes, vec!["A", "D"]);
        assert!((comparison.car.travel_time - 30.0).abs() < 1e-9);
        assert!(comparison.bus.is_empty());
        assert!(comparison.metro.is_empty());
        let (label, fastest) = comparison.fastest().unwrap();
        assert_eq!(label, "mixed");
        assert!((fastest.travel_time - 18.5).abs() < 1e-9);
    }

    #[test]
    fn comparison_rejects_identical_endpoints() {
        let err = compare_modes(&network(), &TrafficTable::new(), "C", "C", TimePeriod::Night)
            .unwrap_err();
        assert_eq!(err, QueryError::SameEndpoints);
    }
}
