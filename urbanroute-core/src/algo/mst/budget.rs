use hashbrown::HashMap;
use itertools::Itertools;
use log::info;
use petgraph::graph::{EdgeIndex, NodeIndex};

use super::{ForestBuilder, SpanningForest};
use crate::model::{NetworkGraph, PlanningContext, RoadType};

/// Existing roads for free, then the cheapest potential roads that join two
/// components while the budget lasts.
pub fn budget_constrained_mst(
    network: &NetworkGraph,
    context: &PlanningContext,
    budget: f64,
) -> SpanningForest {
    let potentials = potential_roads(network)
        .sorted_by(|&a, &b| by_cost(network, a, b))
        .collect();
    let forest = plan(network, context, budget, potentials);
    info!(
        "Budget-constrained MST: {} links, {:.1} spent of {budget:.1}",
        forest.metrics.edge_count, forest.total_cost
    );
    forest
}

/// Like [`budget_constrained_mst`], but potential roads between two
/// important facilities go first, then roads touching one, each group
/// cheapest first.
pub fn connectivity_mst(
    network: &NetworkGraph,
    context: &PlanningContext,
    budget: f64,
) -> SpanningForest {
    let importance = |edge: EdgeIndex| {
        network.endpoints(edge).map_or(2, |(a, b)| {
            let important = [a, b]
                .iter()
                .filter(|&&node| context.is_important(network.place_id(node)))
                .count();
            2 - important
        })
    };
    let potentials = potential_roads(network)
        .sorted_by(|&a, &b| {
            importance(a)
                .cmp(&importance(b))
                .then_with(|| by_cost(network, a, b))
        })
        .collect();
    let forest = plan(network, context, budget, potentials);
    info!(
        "Connectivity MST: {} links, {:.1} spent of {budget:.1}, {} of {} critical facilities reached",
        forest.metrics.edge_count,
        forest.total_cost,
        forest.metrics.covered_facilities,
        forest.metrics.critical_facilities_count
    );
    forest
}

fn potential_roads(network: &NetworkGraph) -> impl Iterator<Item = EdgeIndex> + '_ {
    network
        .graph
        .edge_indices()
        .filter(|&edge| network.link(edge).road_type == RoadType::Potential)
}

fn by_cost(network: &NetworkGraph, a: EdgeIndex, b: EdgeIndex) -> std::cmp::Ordering {
    network
        .link(a)
        .construction_cost
        .total_cmp(&network.link(b).construction_cost)
        .then(a.cmp(&b))
}

/// Shortest existing road per place pair, shortest first.
fn existing_base(network: &NetworkGraph) -> Vec<EdgeIndex> {
    let mut best: HashMap<(NodeIndex, NodeIndex), EdgeIndex> = HashMap::new();
    for edge in network.graph.edge_indices() {
        let link = network.link(edge);
        if link.road_type != RoadType::Existing {
            continue;
        }
        let Some((a, b)) = network.endpoints(edge) else {
            continue;
        };
        let key = if a <= b { (a, b) } else { (b, a) };
        best.entry(key)
            .and_modify(|current| {
                if link.distance < network.link(*current).distance {
                    *current = edge;
                }
            })
            .or_insert(edge);
    }
    best.into_values()
        .sorted_by(|&a, &b| {
            network
                .link(a)
                .distance
                .total_cmp(&network.link(b).distance)
                .then(a.cmp(&b))
        })
        .collect()
}

fn plan(
    network: &NetworkGraph,
    context: &PlanningContext,
    budget: f64,
    potentials: Vec<EdgeIndex>,
) -> SpanningForest {
    let mut forest = ForestBuilder::new(network);
    for edge in existing_base(network) {
        forest.try_add(edge, None);
    }

    let mut remaining = budget;
    for edge in potentials {
        if remaining <= 0.0 || forest.is_connected() {
            break;
        }
        let cost = network.link(edge).construction_cost;
        let Some((a, b)) = network.endpoints(edge) else {
            continue;
        };
        if cost > remaining || !forest.joins(a, b) {
            continue;
        }
        if forest.try_add(edge, None) {
            remaining -= cost;
        }
    }

    forest.finish(context, Some(remaining))
}
