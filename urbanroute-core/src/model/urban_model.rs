use crate::loading::{Dataset, build_network};

use super::{NetworkGraph, PlanningContext, TrafficTable};

/// A dataset snapshot together with the network built from it.
///
/// Immutable once created; share it behind an `Arc` between query threads.
#[derive(Debug, Clone)]
pub struct UrbanModel {
    pub graph: NetworkGraph,
    pub context: PlanningContext,
    pub dataset: Dataset,
}

impl UrbanModel {
    pub fn from_dataset(dataset: Dataset) -> Self {
        let graph = build_network(&dataset);
        let context = PlanningContext::from_graph(&graph);
        Self {
            graph,
            context,
            dataset,
        }
    }

    pub fn traffic(&self) -> &TrafficTable {
        &self.dataset.traffic
    }

    pub fn summary(&self) -> String {
        format!(
            "{} places ({} bus stops, {} metro stations), {} links, {} traffic pairs",
            self.graph.node_count(),
            self.graph.bus_stops().len(),
            self.graph.metro_stations().len(),
            self.graph.edge_count(),
            self.dataset.traffic.len()
        )
    }
}
