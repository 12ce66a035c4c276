use fixedbitset::FixedBitSet;
use geo::Point;
use hashbrown::HashMap;
use log::{debug, info, warn};
use petgraph::graph::NodeIndex;

use super::config::DatasetConfig;
use super::dataset::{Dataset, load_dataset};
use crate::model::geometry::planar_distance;
use crate::model::{
    BuildReport, FacilityKind, Link, NetworkGraph, Place, PlaceKind, RoadType, UrbanModel,
};
use crate::routing::dijkstra::road_distances;
use crate::{Error, MAX_EDGE_DISTANCE, Meters};

/// Default length of a bus hop when no road joins its stops and the road
/// table is empty.
const DEFAULT_BUS_HOP: Meters = 1500.0;
/// Same for metro hops.
const DEFAULT_METRO_HOP: Meters = 2000.0;
/// Length of a virtual link when the anchor is unreachable by road.
const FALLBACK_LINK_DISTANCE: Meters = 1000.0;
/// Degrees added to both axes of a synthesized position.
const POSITION_OFFSET: f64 = 0.01;

/// Loads the dataset and builds the network model from it.
///
/// # Errors
///
/// Returns an error if the dataset cannot be read
pub fn create_urban_model(config: &DatasetConfig) -> Result<UrbanModel, Error> {
    let dataset = load_dataset(config)?;
    let model = UrbanModel::from_dataset(dataset);
    info!("Urban model created: {}", model.summary());
    Ok(model)
}

/// Builds the network graph from raw tables.
///
/// Never fails as a whole: records that cannot become valid places or links
/// are skipped with a warning and counted in the [`BuildReport`].
pub fn build_network(dataset: &Dataset) -> NetworkGraph {
    let mut builder = NetworkBuilder::new(dataset);
    builder.add_places();
    builder.add_existing_roads();
    builder.add_transit_lines();
    builder.add_potential_roads();
    builder.synthesize_positions();
    builder.connect_isolated();
    builder.finish()
}

struct NetworkBuilder<'a> {
    dataset: &'a Dataset,
    network: NetworkGraph,
    /// Nodes whose position came from the source tables
    sourced: FixedBitSet,
    /// Accepted existing-road length per unordered id pair, first row wins
    road_lengths: HashMap<(String, String), Meters>,
    mean_road_length: Option<Meters>,
    report: BuildReport,
}

impl<'a> NetworkBuilder<'a> {
    fn new(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            network: NetworkGraph::new(),
            sourced: FixedBitSet::new(),
            road_lengths: HashMap::new(),
            mean_road_length: None,
            report: BuildReport {
                rejected_records: dataset.rejected_rows,
                ..BuildReport::default()
            },
        }
    }

    fn insert_place(&mut self, place: Place, position: Option<Point<f64>>) -> NodeIndex {
        if self.network.node(&place.id).is_some() {
            debug!("Duplicate place id '{}', keeping the first record", place.id);
        }
        let node = self.network.add_place(place);
        self.sourced.grow(node.index() + 1);
        if let Some(position) = position
            && !self.sourced.contains(node.index())
        {
            self.network.graph[node].geometry = position;
            self.sourced.insert(node.index());
        }
        node
    }

    fn add_places(&mut self) {
        let dataset = self.dataset;
        for record in &dataset.neighborhoods {
            let place = Place {
                id: record.id.clone(),
                name: record.name.trim().to_string(),
                geometry: Point::new(0.0, 0.0),
                kind: PlaceKind::Neighborhood,
                population: Some(record.population),
                facility: None,
                district: Some(record.district_type.trim().to_lowercase()),
            };
            let position = finite_point(Some(record.x), Some(record.y));
            if position.is_none() {
                warn!("Neighborhood '{}' has invalid coordinates", record.id);
            }
            self.insert_place(place, position);
        }

        for record in &dataset.facilities {
            let place = Place {
                id: record.id.clone(),
                name: record.name.trim().to_string(),
                geometry: Point::new(0.0, 0.0),
                kind: PlaceKind::Facility,
                population: None,
                facility: Some(FacilityKind::parse(&record.facility_type)),
                district: None,
            };
            self.insert_place(place, finite_point(record.x, record.y));
        }
    }

    /// Resolves both endpoints of a road row, rejecting unknown ids and loops.
    fn road_endpoints(&mut self, from: &str, to: &str) -> Option<(NodeIndex, NodeIndex)> {
        match (self.network.node(from), self.network.node(to)) {
            (Some(a), Some(b)) if a != b => Some((a, b)),
            (Some(_), Some(_)) => {
                warn!("Skipping self-loop road at '{from}'");
                self.report.rejected_edges += 1;
                None
            }
            _ => {
                warn!("Skipping road {from}-{to}: unknown endpoint");
                self.report.rejected_edges += 1;
                None
            }
        }
    }

    /// Converts a kilometre length to meters and applies the length cap.
    fn checked_distance(&mut self, from: &str, to: &str, distance_km: f64) -> Option<Meters> {
        let meters = distance_km * 1000.0;
        if !meters.is_finite() || meters <= 0.0 {
            warn!("Invalid distance between {from} and {to}: {distance_km} km");
            self.report.rejected_edges += 1;
            return None;
        }
        if meters > MAX_EDGE_DISTANCE {
            warn!("Unrealistic distance between {from} and {to}: {distance_km} km");
            self.report.rejected_edges += 1;
            return None;
        }
        Some(meters)
    }

    fn add_existing_roads(&mut self) {
        let dataset = self.dataset;
        let mut accepted = Vec::new();
        for record in &dataset.existing_roads {
            let Some(distance) =
                self.checked_distance(&record.from_id, &record.to_id, record.distance_km)
            else {
                continue;
            };
            let Some((a, b)) = self.road_endpoints(&record.from_id, &record.to_id) else {
                continue;
            };
            self.network.add_link(
                a,
                b,
                Link::road(distance, record.capacity.max(0.0), record.condition),
            );
            self.road_lengths
                .entry(pair_key(&record.from_id, &record.to_id))
                .or_insert(distance);
            accepted.push(distance);
        }

        if !accepted.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let mean = accepted.iter().sum::<f64>() / accepted.len() as f64;
            self.mean_road_length = Some(mean);
        }
    }

    /// Length of a transit hop: the road joining its ends, else the mean road.
    fn hop_length(&self, from: &str, to: &str, default: Meters) -> Meters {
        self.road_lengths
            .get(&pair_key(from, to))
            .copied()
            .or(self.mean_road_length)
            .unwrap_or(default)
    }

    fn transit_node(&mut self, id: &str, kind: PlaceKind) -> NodeIndex {
        match self.network.node(id) {
            Some(node) => node,
            None => self.insert_place(
                Place {
                    id: id.to_string(),
                    name: id.to_string(),
                    geometry: Point::new(0.0, 0.0),
                    kind,
                    population: None,
                    facility: None,
                    district: None,
                },
                None,
            ),
        }
    }

    fn add_transit_lines(&mut self) {
        let dataset = self.dataset;
        for route in &dataset.bus_routes {
            let stops = route.stop_ids();
            if stops.len() < 2 {
                warn!("Bus route {} has fewer than two stops", route.route_id);
                self.report.rejected_records += 1;
                continue;
            }
            for hop in stops.windows(2) {
                let a = self.transit_node(&hop[0], PlaceKind::BusStop);
                let b = self.transit_node(&hop[1], PlaceKind::BusStop);
                self.network.mark_bus_stop(a);
                self.network.mark_bus_stop(b);
                if a == b {
                    warn!("Bus route {} repeats stop {}", route.route_id, hop[0]);
                    self.report.rejected_edges += 1;
                    continue;
                }
                let distance = self.hop_length(&hop[0], &hop[1], DEFAULT_BUS_HOP);
                let link = Link::bus(
                    distance,
                    route.daily_passengers / 24.0,
                    &route.route_id,
                    route.buses_assigned,
                );
                self.network.add_link(a, b, link);
            }
        }

        for line in &dataset.metro_lines {
            let stations = line.station_ids();
            if stations.len() < 2 {
                warn!("Metro line {} has fewer than two stations", line.line_id);
                self.report.rejected_records += 1;
                continue;
            }
            for hop in stations.windows(2) {
                let a = self.transit_node(&hop[0], PlaceKind::MetroStation);
                let b = self.transit_node(&hop[1], PlaceKind::MetroStation);
                self.network.mark_metro_station(a);
                self.network.mark_metro_station(b);
                if a == b {
                    warn!("Metro line {} repeats station {}", line.line_id, hop[0]);
                    self.report.rejected_edges += 1;
                    continue;
                }
                let distance = self.hop_length(&hop[0], &hop[1], DEFAULT_METRO_HOP);
                let link = Link::metro(distance, line.daily_passengers / 24.0, &line.line_id);
                self.network.add_link(a, b, link);
            }
        }
    }

    fn add_potential_roads(&mut self) {
        let dataset = self.dataset;
        for record in &dataset.potential_roads {
            let Some(distance) =
                self.checked_distance(&record.from_id, &record.to_id, record.distance_km)
            else {
                continue;
            };
            let Some((a, b)) = self.road_endpoints(&record.from_id, &record.to_id) else {
                continue;
            };
            let link = Link::potential(
                distance,
                record.capacity.max(0.0),
                record.construction_cost.max(0.0),
            );
            self.network.add_link(a, b, link);
        }
    }

    /// Gives every positionless node the position of its closest sourced
    /// node (by road distance), nudged by a small offset, and ties the two
    /// together with a virtual link.
    fn synthesize_positions(&mut self) {
        let node_count = self.network.node_count();
        self.sourced.grow(node_count);
        let Some(first_sourced) = self.sourced.ones().next().map(NodeIndex::new) else {
            if node_count > 0 {
                warn!("No place has coordinates; every place stays at the origin");
                self.report.synthesized_positions = node_count;
            }
            return;
        };

        for index in 0..node_count {
            if self.sourced.contains(index) {
                continue;
            }
            let node = NodeIndex::new(index);
            let distances = road_distances(&self.network, node, None);
            let (anchor, distance) = distances
                .iter()
                .filter(|(candidate, _)| self.sourced.contains(candidate.index()))
                .min_by(|a, b| a.1.total_cmp(b.1).then(a.0.cmp(b.0)))
                .map_or((first_sourced, FALLBACK_LINK_DISTANCE), |(&n, &d)| (n, d));

            let anchor_position = self.network.position(anchor);
            self.network.graph[node].geometry = Point::new(
                anchor_position.x() + POSITION_OFFSET,
                anchor_position.y() + POSITION_OFFSET,
            );
            let link = Link::virtual_edge(RoadType::VirtualLink, capped(distance));
            self.network.add_link(node, anchor, link);
            self.report.synthesized_positions += 1;
            self.report.virtual_links += 1;
            debug!(
                "Placed '{}' next to '{}' ({distance:.0} m by road)",
                self.network.place_id(node),
                self.network.place_id(anchor)
            );
        }
    }

    /// Links every node without edges to its geographically nearest place.
    fn connect_isolated(&mut self) {
        self.network.rebuild_spatial_index();
        let isolated: Vec<NodeIndex> = self
            .network
            .graph
            .node_indices()
            .filter(|&node| self.network.degree(node) == 0)
            .collect();

        for node in isolated {
            if self.network.degree(node) > 0 {
                continue;
            }
            let position = self.network.position(node);
            let Some((nearest, _)) = self.network.nearest_place(position, Some(node)) else {
                continue;
            };
            let distance = road_distances(&self.network, node, Some(nearest))
                .get(&nearest)
                .copied()
                .unwrap_or_else(|| {
                    planar_distance(position, self.network.position(nearest)).max(1.0)
                });
            let link = Link::virtual_edge(RoadType::VirtualConnection, capped(distance));
            self.network.add_link(node, nearest, link);
            self.report.virtual_connections += 1;
            debug!(
                "Connected isolated '{}' to '{}'",
                self.network.place_id(node),
                self.network.place_id(nearest)
            );
        }
    }

    fn finish(mut self) -> NetworkGraph {
        self.report.places = self.network.node_count();
        self.report.links = self.network.edge_count();
        info!(
            "Built network with {} places and {} links ({} edges rejected, {} virtual links, \
             {} virtual connections)",
            self.report.places,
            self.report.links,
            self.report.rejected_edges,
            self.report.virtual_links,
            self.report.virtual_connections
        );
        self.network.report = self.report;
        self.network.rebuild_spatial_index();
        self.network
    }
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

fn finite_point(x: Option<f64>, y: Option<f64>) -> Option<Point<f64>> {
    match (x, y) {
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(Point::new(x, y)),
        _ => None,
    }
}

/// Synthetic links obey the same length cap as real ones.
fn capped(distance: Meters) -> Meters {
    if distance > MAX_EDGE_DISTANCE {
        warn!("Virtual link of {distance:.0} m capped to {MAX_EDGE_DISTANCE} m");
        MAX_EDGE_DISTANCE
    } else {
        distance
    }
}
