//! Kruskal-style network design: spanning forests weighted by population,
//! limited by a construction budget, or steered towards important
//! facilities.

mod budget;
mod population;

pub use budget::{budget_constrained_mst, connectivity_mst};
pub use population::{MstWeights, population_weighted_mst};

use geo::line_string;
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::unionfind::UnionFind;
use serde::Serialize;
use serde_json::json;

use crate::model::{NetworkGraph, PlanningContext, RoadType};
use crate::{Error, Meters};

/// One selected link of a spanning forest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForestEdge {
    pub edge: EdgeIndex,
    pub from: String,
    pub to: String,
    pub road_type: RoadType,
    pub distance: Meters,
    pub construction_cost: f64,
    /// Kruskal key used by the population-weighted variant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_weight: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForestMetrics {
    pub total_distance: Meters,
    pub total_distance_km: f64,
    pub node_count: usize,
    pub edge_count: usize,
    pub component_count: usize,
    /// Population living at places touched by a selected link
    pub covered_population: f64,
    pub population_coverage_percent: f64,
    pub critical_facilities_count: usize,
    pub covered_facilities: usize,
    pub facility_coverage_percent: f64,
    pub average_node_degree: f64,
}

/// Acyclic selection of links; one tree per connected component reached.
#[derive(Debug, Clone, Serialize)]
pub struct SpanningForest {
    pub edges: Vec<ForestEdge>,
    pub metrics: ForestMetrics,
    /// Construction cost of the selected potential roads
    pub total_cost: f64,
    /// Budget left, for the budget-limited variants
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_budget: Option<f64>,
}

impl SpanningForest {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// One `LineString` feature per selected link.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected link no longer exists in `network` or a
    /// feature cannot be built
    pub fn to_geojson(&self, network: &NetworkGraph) -> Result<FeatureCollection, Error> {
        let features = self
            .edges
            .iter()
            .map(|selected| edge_feature(network, selected))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }
}

fn edge_feature(network: &NetworkGraph, selected: &ForestEdge) -> Result<Feature, Error> {
    let (a, b) = network
        .endpoints(selected.edge)
        .ok_or_else(|| Error::GeoJsonError(format!("unknown link {}", selected.edge.index())))?;
    let (from, to) = (network.position(a), network.position(b));
    let line = line_string![(x: from.x(), y: from.y()), (x: to.x(), y: to.y())];
    let geometry = Geometry::new(GeoJsonValue::from(&line));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "from": selected.from,
            "to": selected.to,
            "road_type": selected.road_type.as_str(),
            "distance_m": selected.distance,
            "construction_cost": selected.construction_cost,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

/// Incremental forest shared by every variant: a link is only accepted when
/// it joins two different components.
pub(crate) struct ForestBuilder<'a> {
    network: &'a NetworkGraph,
    components: UnionFind<usize>,
    component_count: usize,
    degree: Vec<usize>,
    edges: Vec<ForestEdge>,
}

impl<'a> ForestBuilder<'a> {
    pub(crate) fn new(network: &'a NetworkGraph) -> Self {
        let node_count = network.node_count();
        Self {
            network,
            components: UnionFind::new(node_count),
            component_count: node_count,
            degree: vec![0; node_count],
            edges: Vec::new(),
        }
    }

    pub(crate) fn joins(&self, a: NodeIndex, b: NodeIndex) -> bool {
        !self.components.equiv(a.index(), b.index())
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.component_count <= 1
    }

    /// Adds `edge` unless it would close a cycle.
    pub(crate) fn try_add(&mut self, edge: EdgeIndex, modified_weight: Option<f64>) -> bool {
        let Some((a, b)) = self.network.endpoints(edge) else {
            return false;
        };
        if !self.components.union(a.index(), b.index()) {
            return false;
        }
        self.component_count -= 1;
        self.degree[a.index()] += 1;
        self.degree[b.index()] += 1;

        let link = self.network.link(edge);
        self.edges.push(ForestEdge {
            edge,
            from: self.network.place_id(a).to_string(),
            to: self.network.place_id(b).to_string(),
            road_type: link.road_type,
            distance: link.distance,
            construction_cost: link.construction_cost,
            modified_weight,
        });
        true
    }

    pub(crate) fn finish(
        self,
        context: &PlanningContext,
        remaining_budget: Option<f64>,
    ) -> SpanningForest {
        let metrics = self.metrics(context);
        let total_cost = self.edges.iter().map(|e| e.construction_cost).sum();
        SpanningForest {
            edges: self.edges,
            metrics,
            total_cost,
            remaining_budget,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn metrics(&self, context: &PlanningContext) -> ForestMetrics {
        let node_count = self.network.node_count();
        let edge_count = self.edges.len();
        let total_distance: Meters = self.edges.iter().map(|e| e.distance).sum();

        let covered = |id: &str| {
            self.network
                .node(id)
                .is_some_and(|node| self.degree[node.index()] > 0)
        };
        let covered_population: f64 = self
            .network
            .places()
            .filter(|(node, _)| self.degree[node.index()] > 0)
            .map(|(_, place)| context.population(&place.id))
            .sum();
        let total_population = context.total_population();
        let critical = context.critical_facilities();
        let covered_facilities = critical.iter().filter(|&&id| covered(id)).count();

        ForestMetrics {
            total_distance,
            total_distance_km: total_distance / 1000.0,
            node_count,
            edge_count,
            component_count: self.component_count,
            covered_population,
            population_coverage_percent: percent(covered_population, total_population),
            critical_facilities_count: critical.len(),
            covered_facilities,
            facility_coverage_percent: percent(covered_facilities as f64, critical.len() as f64),
            average_node_degree: if node_count == 0 {
                0.0
            } else {
                2.0 * edge_count as f64 / node_count as f64
            },
        }
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}
