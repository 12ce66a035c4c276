//! Heterogeneous multigraph of places and links

pub mod components;

use geo::Point;
use hashbrown::{HashMap, HashSet};
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rstar::RTree;
use rstar::primitives::GeomWithData;
use serde::Serialize;

pub use components::{FacilityKind, Link, Place, PlaceKind, RoadType, ServiceLine};

use super::TransportMode;
use super::geometry::project;
use crate::{Meters, QueryError};

/// Spatial index entry: projected position of a place
pub type IndexedPlace = GeomWithData<[f64; 2], NodeIndex>;

/// Summary of what graph construction kept, rejected and synthesized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub places: usize,
    pub links: usize,
    pub rejected_records: usize,
    pub rejected_edges: usize,
    pub synthesized_positions: usize,
    pub virtual_links: usize,
    pub virtual_connections: usize,
}

/// The network: one node per place, one edge per link, parallel edges
/// allowed. Node and edge indices are stable handles because nothing is
/// ever removed.
#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    pub graph: UnGraph<Place, Link>,
    index: HashMap<String, NodeIndex>,
    bus_stops: HashSet<NodeIndex>,
    metro_stations: HashSet<NodeIndex>,
    spatial: RTree<IndexedPlace>,
    pub report: BuildReport,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a place, or returns the existing node if the id is already known.
    pub fn add_place(&mut self, place: Place) -> NodeIndex {
        if let Some(&node) = self.index.get(&place.id) {
            return node;
        }
        let id = place.id.clone();
        let node = self.graph.add_node(place);
        self.index.insert(id, node);
        node
    }

    pub fn add_link(&mut self, a: NodeIndex, b: NodeIndex, link: Link) -> EdgeIndex {
        self.graph.add_edge(a, b, link)
    }

    pub fn mark_bus_stop(&mut self, node: NodeIndex) {
        self.bus_stops.insert(node);
    }

    pub fn mark_metro_station(&mut self, node: NodeIndex) {
        self.metro_stations.insert(node);
    }

    /// Rebuilds the R-tree over place positions. Must be called after
    /// positions change.
    pub fn rebuild_spatial_index(&mut self) {
        let entries = self
            .graph
            .node_indices()
            .map(|node| IndexedPlace::new(project(self.graph[node].geometry), node))
            .collect();
        self.spatial = RTree::bulk_load(entries);
    }

    pub fn node(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn lookup(&self, id: &str) -> Result<NodeIndex, QueryError> {
        self.node(id)
            .ok_or_else(|| QueryError::UnknownPlace(id.to_string()))
    }

    pub fn place(&self, node: NodeIndex) -> &Place {
        &self.graph[node]
    }

    pub fn place_by_id(&self, id: &str) -> Option<&Place> {
        self.node(id).map(|node| &self.graph[node])
    }

    pub fn place_id(&self, node: NodeIndex) -> &str {
        &self.graph[node].id
    }

    pub fn position(&self, node: NodeIndex) -> Point<f64> {
        self.graph[node].geometry
    }

    pub fn link(&self, edge: EdgeIndex) -> &Link {
        &self.graph[edge]
    }

    pub fn endpoints(&self, edge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(edge)
    }

    /// Endpoint of `edge` opposite to `from`.
    pub fn other_end(&self, edge: EdgeIndex, from: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edge_endpoints(edge)
            .map(|(a, b)| if a == from { b } else { a })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn places(&self) -> impl Iterator<Item = (NodeIndex, &Place)> {
        self.graph
            .node_indices()
            .map(move |node| (node, &self.graph[node]))
    }

    /// Links touching `node` as `(edge, neighbour, link)`.
    pub fn incident_links(
        &self,
        node: NodeIndex,
    ) -> impl Iterator<Item = (EdgeIndex, NodeIndex, &Link)> {
        self.graph.edges(node).map(move |edge| {
            let other = if edge.source() == node {
                edge.target()
            } else {
                edge.source()
            };
            (edge.id(), other, edge.weight())
        })
    }

    /// Parallel links between two places.
    pub fn links_between(
        &self,
        a: NodeIndex,
        b: NodeIndex,
    ) -> impl Iterator<Item = (EdgeIndex, &Link)> {
        self.graph
            .edges_connecting(a, b)
            .map(|edge| (edge.id(), edge.weight()))
    }

    pub fn degree(&self, node: NodeIndex) -> usize {
        self.graph.edges(node).count()
    }

    pub fn is_bus_stop(&self, node: NodeIndex) -> bool {
        self.bus_stops.contains(&node)
    }

    pub fn is_metro_station(&self, node: NodeIndex) -> bool {
        self.metro_stations.contains(&node)
    }

    pub fn bus_stops(&self) -> Vec<NodeIndex> {
        let mut stops: Vec<_> = self.bus_stops.iter().copied().collect();
        stops.sort_unstable();
        stops
    }

    pub fn metro_stations(&self) -> Vec<NodeIndex> {
        let mut stations: Vec<_> = self.metro_stations.iter().copied().collect();
        stations.sort_unstable();
        stations
    }

    /// Whether a trip in `mode` may start or end at `node`.
    pub fn serves(&self, node: NodeIndex, mode: TransportMode) -> bool {
        match mode {
            TransportMode::Car | TransportMode::Emergency => {
                node.index() < self.graph.node_count()
            }
            TransportMode::Bus => self.is_bus_stop(node),
            TransportMode::Metro => self.is_metro_station(node),
        }
    }

    /// Places a trip in `mode` may start or end at, in index order.
    pub fn eligible_places(&self, mode: TransportMode) -> Vec<NodeIndex> {
        match mode {
            TransportMode::Car | TransportMode::Emergency => self.graph.node_indices().collect(),
            TransportMode::Bus => self.bus_stops(),
            TransportMode::Metro => self.metro_stations(),
        }
    }

    /// Places with a hospital or medical facility, the dispatch points for
    /// emergency trips.
    pub fn medical_facilities(&self) -> Vec<NodeIndex> {
        self.places()
            .filter(|(_, place)| place.facility.is_some_and(FacilityKind::is_medical))
            .map(|(node, _)| node)
            .collect()
    }

    pub fn is_medical_facility(&self, node: NodeIndex) -> bool {
        self.graph
            .node_weight(node)
            .is_some_and(|place| place.facility.is_some_and(FacilityKind::is_medical))
    }

    /// Nearest other place to `point` by projected distance.
    pub fn nearest_place(
        &self,
        point: Point<f64>,
        exclude: Option<NodeIndex>,
    ) -> Option<(NodeIndex, Meters)> {
        let query = project(point);
        self.spatial
            .nearest_neighbor_iter_with_distance_2(&query)
            .find(|(entry, _)| Some(entry.data) != exclude)
            .map(|(entry, distance_2)| (entry.data, distance_2.sqrt()))
    }

    /// Places within `radius` meters of `point`, closest first.
    pub fn places_within(&self, point: Point<f64>, radius: Meters) -> Vec<(NodeIndex, Meters)> {
        let query = project(point);
        let mut found: Vec<_> = self
            .spatial
            .locate_within_distance(query, radius * radius)
            .map(|entry| {
                let [x, y] = *entry.geom();
                (entry.data, (x - query[0]).hypot(y - query[1]))
            })
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        found
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn place(id: &str, x: f64, y: f64) -> Place {
        Place {
            id: id.to_string(),
            name: id.to_string(),
            geometry: Point::new(x, y),
            kind: PlaceKind::Neighborhood,
            population: None,
            facility: None,
            district: None,
        }
    }

    #[test]
    fn duplicate_ids_map_to_one_node() {
        let mut network = NetworkGraph::new();
        let a = network.add_place(place("A", 0.0, 0.0));
        let again = network.add_place(place("A", 5.0, 5.0));
        assert_eq!(a, again);
        assert_eq!(network.node_count(), 1);
        assert_eq!(network.position(a), Point::new(0.0, 0.0));
    }

    #[test]
    fn parallel_links_are_kept_apart() {
        let mut network = NetworkGraph::new();
        let a = network.add_place(place("A", 0.0, 0.0));
        let b = network.add_place(place("B", 0.01, 0.0));
        let road = network.add_link(a, b, Link::road(1000.0, 2000.0, 7.0));
        let bus = network.add_link(b, a, Link::bus(1000.0, 100.0, "B1", 4));
        assert_ne!(road, bus);
        assert_eq!(network.links_between(a, b).count(), 2);
        assert_eq!(network.links_between(b, a).count(), 2);
        assert_eq!(network.degree(a), 2);
        assert_eq!(network.other_end(bus, a), Some(b));
        assert_eq!(network.other_end(bus, b), Some(a));
    }

    #[test]
    fn incident_links_report_the_far_end() {
        let mut network = NetworkGraph::new();
        let a = network.add_place(place("A", 0.0, 0.0));
        let b = network.add_place(place("B", 0.01, 0.0));
        let c = network.add_place(place("C", 0.02, 0.0));
        network.add_link(a, b, Link::road(1000.0, 2000.0, 7.0));
        network.add_link(c, b, Link::road(1000.0, 2000.0, 7.0));
        let mut neighbours: Vec<_> = network.incident_links(b).map(|(_, n, _)| n).collect();
        neighbours.sort_unstable();
        assert_eq!(neighbours, vec![a, c]);
    }

    #[test]
    fn spatial_queries_skip_excluded_node() {
        let mut network = NetworkGraph::new();
        let a = network.add_place(place("A", 31.0, 30.0));
        let b = network.add_place(place("B", 31.01, 30.0));
        network.add_place(place("C", 31.5, 30.0));
        network.rebuild_spatial_index();

        let (nearest, distance) = network
            .nearest_place(network.position(a), Some(a))
            .unwrap();
        assert_eq!(nearest, b);
        assert!((distance - 1110.0).abs() < 1e-6);

        let within = network.places_within(network.position(a), 2000.0);
        assert_eq!(within.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn modes_serve_their_own_stops() {
        let mut network = NetworkGraph::new();
        let a = network.add_place(place("A", 0.0, 0.0));
        let b = network.add_place(place("B", 0.0, 0.0));
        network.mark_bus_stop(b);
        assert!(network.serves(a, TransportMode::Car));
        assert!(!network.serves(a, TransportMode::Bus));
        assert!(network.serves(b, TransportMode::Bus));
        assert!(network.eligible_places(TransportMode::Metro).is_empty());
    }
}
