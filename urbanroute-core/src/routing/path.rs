use geo::{Coord, LineString};
use geojson::{Feature, Geometry, Value as GeoJsonValue};
use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::Serialize;
use serde_json::json;

use super::mixed::MODE_SWITCH_PENALTY;
use super::weights::edge_weight;
use crate::model::{NetworkGraph, TimePeriod, TrafficTable, TransportMode};
use crate::{Error, Meters, Minutes, PlaceId};

/// Result of a point-to-point search.
///
/// An empty path (no nodes, zero distance and time) means the destination
/// could not be reached; check [`RoutePath::is_empty`] before using it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoutePath {
    /// Place ids from start to end
    pub nodes: Vec<PlaceId>,
    #[serde(skip)]
    pub node_indices: Vec<NodeIndex>,
    /// Edge keys, one per hop
    pub edges: Vec<EdgeIndex>,
    /// Mode used on each hop
    pub modes: Vec<TransportMode>,
    pub distance: Meters,
    pub travel_time: Minutes,
}

impl RoutePath {
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn hop_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of times the route changes vehicle.
    pub fn mode_switches(&self) -> usize {
        self.modes.windows(2).filter(|w| w[0] != w[1]).count()
    }

    /// Assembles a path from hops already ordered start to end.
    pub(crate) fn from_hops(
        network: &NetworkGraph,
        start: NodeIndex,
        hops: &[(EdgeIndex, NodeIndex, TransportMode)],
        travel_time: Minutes,
    ) -> Self {
        let mut node_indices = Vec::with_capacity(hops.len() + 1);
        node_indices.push(start);
        node_indices.extend(hops.iter().map(|&(_, node, _)| node));
        Self {
            nodes: node_indices
                .iter()
                .map(|&node| network.place_id(node).to_string())
                .collect(),
            node_indices,
            edges: hops.iter().map(|&(edge, _, _)| edge).collect(),
            modes: hops.iter().map(|&(_, _, mode)| mode).collect(),
            distance: hops
                .iter()
                .map(|&(edge, _, _)| network.link(edge).distance)
                .sum(),
            travel_time,
        }
    }

    /// Travel time re-derived hop by hop from the weight model, including
    /// mode-switch penalties. Agrees with `travel_time` for any path a
    /// search produced against the same traffic table.
    pub fn recomputed_travel_time(
        &self,
        network: &NetworkGraph,
        traffic: &TrafficTable,
        period: TimePeriod,
    ) -> Option<Minutes> {
        let mut total = 0.0;
        for (i, (&edge, &mode)) in self.edges.iter().zip(&self.modes).enumerate() {
            let from = *self.node_indices.get(i)?;
            total += edge_weight(network, traffic, edge, from, mode, period)?;
        }
        #[allow(clippy::cast_precision_loss)]
        let penalties = self.mode_switches() as f64 * MODE_SWITCH_PENALTY;
        Some(total + penalties)
    }

    /// Renders the path as a `LineString` feature.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or the feature cannot be built
    pub fn to_geojson(&self, network: &NetworkGraph) -> Result<Feature, Error> {
        if self.is_empty() {
            return Err(Error::GeoJsonError("cannot render an empty path".into()));
        }
        let coords: Vec<Coord<f64>> = self
            .node_indices
            .iter()
            .map(|&node| network.position(node).into())
            .collect();
        let geometry = Geometry::new(GeoJsonValue::from(&LineString::new(coords)));
        let modes: Vec<&str> = self.modes.iter().map(|mode| mode.as_str()).collect();

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "from": self.nodes.first(),
                "to": self.nodes.last(),
                "stops": self.nodes,
                "modes": modes,
                "distance_m": self.distance,
                "travel_time_min": self.travel_time,
            }
        });

        serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::dijkstra::tests::sample_network;
    use crate::routing::mixed_mode;

    #[test]
    fn mixed_path_counts_switches_and_penalties() {
        let network = sample_network();
        let traffic = TrafficTable::new();
        let a = network.node("A").unwrap();
        let e = network.node("E").unwrap();
        let path = mixed_mode(&network, &traffic, a, e, TimePeriod::Night);
        assert_eq!(path.modes.last(), Some(&TransportMode::Bus));
        assert_eq!(path.mode_switches(), 1);
        let recomputed = path
            .recomputed_travel_time(&network, &traffic, TimePeriod::Night)
            .unwrap();
        assert!((recomputed - path.travel_time).abs() < 1e-9);
    }

    #[test]
    fn geojson_traces_the_places() {
        let network = sample_network();
        let a = network.node("A").unwrap();
        let c = network.node("C").unwrap();
        let path = mixed_mode(&network, &TrafficTable::new(), a, c, TimePeriod::Night);
        let feature = path.to_geojson(&network).unwrap();
        let Some(geometry) = feature.geometry else {
            panic!("feature without geometry");
        };
        let GeoJsonValue::LineString { coordinates: coords } = geometry.value else {
            panic!("expected a line string");
        };
        assert_eq!(coords.len(), path.nodes.len());
        assert_eq!(feature.properties.unwrap()["to"], "C");
    }

    #[test]
    fn empty_path_has_no_geometry() {
        let network = sample_network();
        assert!(RoutePath::unreachable().to_geojson(&network).is_err());
        assert_eq!(RoutePath::unreachable().mode_switches(), 0);
    }
}
