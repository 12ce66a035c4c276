use log::info;
use petgraph::graph::EdgeIndex;
use serde::{Deserialize, Serialize};

use super::{ForestBuilder, SpanningForest};
use crate::model::{NetworkGraph, PlanningContext};
use crate::{MAX_EDGE_DISTANCE, Meters};

/// Combined population at which a link gets the full population discount.
const POPULATION_SCALE: f64 = 1_000_000.0;
/// Facility factor of links touching a critical facility.
const CRITICAL_FACILITY_FACTOR: f64 = 0.5;

/// Blend between the population and critical-facility terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MstWeights {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for MstWeights {
    fn default() -> Self {
        Self {
            alpha: 0.7,
            beta: 0.3,
        }
    }
}

impl MstWeights {
    /// Kruskal key of a link: busier ends and critical facilities make it
    /// cheaper and therefore picked earlier.
    pub fn modified_weight(&self, distance: Meters, population: f64, critical: bool) -> f64 {
        let pop_factor = 1.0 - (population / POPULATION_SCALE).clamp(0.0, 1.0);
        let facility_factor = if critical {
            CRITICAL_FACILITY_FACTOR
        } else {
            1.0
        };
        distance * (self.alpha * pop_factor + self.beta * facility_factor)
    }
}

/// Spanning forest over every link, ordered by population-weighted length.
///
/// Kruskal over the full candidate list already spans every component, so a
/// critical facility with any link under the distance cap ends up in the
/// forest.
pub fn population_weighted_mst(
    network: &NetworkGraph,
    context: &PlanningContext,
    weights: MstWeights,
) -> SpanningForest {
    let mut candidates: Vec<(EdgeIndex, f64)> = network
        .graph
        .edge_indices()
        .filter_map(|edge| {
            let link = network.link(edge);
            if link.distance > MAX_EDGE_DISTANCE {
                return None;
            }
            let (a, b) = network.endpoints(edge)?;
            let (a, b) = (network.place_id(a), network.place_id(b));
            let population = context.population(a) + context.population(b);
            let critical = context.is_critical(a) || context.is_critical(b);
            Some((edge, weights.modified_weight(link.distance, population, critical)))
        })
        .collect();
    candidates.sort_by(|x, y| x.1.total_cmp(&y.1).then(x.0.cmp(&y.0)));

    let mut forest = ForestBuilder::new(network);
    for &(edge, weight) in &candidates {
        forest.try_add(edge, Some(weight));
    }

    let forest = forest.finish(context, None);
    info!(
        "Population-weighted MST: {} links, {:.1} km, {:.1}% population covered",
        forest.metrics.edge_count,
        forest.metrics.total_distance_km,
        forest.metrics.population_coverage_percent
    );
    forest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::mst::tests::assert_forest;
    use crate::model::network::tests::place;
    use crate::model::{FacilityKind, Link};

    fn district() -> (NetworkGraph, PlanningContext) {
        let mut network = NetworkGraph::new();
        let a = network.add_place(place("1", 31.00, 30.00));
        let b = network.add_place(place("2", 31.02, 30.00));
        let c = network.add_place(place("3", 31.04, 30.00));
        let h = network.add_place(place("H", 31.02, 30.02));
        network.add_place(place("9", 32.00, 31.00));
        network.add_link(a, b, Link::road(2000.0, 2000.0, 7.0));
        network.add_link(b, c, Link::road(2000.0, 2000.0, 7.0));
        network.add_link(a, c, Link::road(3000.0, 2000.0, 7.0));
        network.add_link(b, h, Link::road(2500.0, 1500.0, 8.0));
        network.add_link(c, h, Link::potential(2400.0, 1500.0, 30.0));
        network.add_link(a, b, Link::bus(2100.0, 300.0, "B1", 5));

        let context = PlanningContext::from_graph(&network)
            .with_population("1", 600_000.0)
            .with_population("3", 500_000.0)
            .with_population("2", 10_000.0)
            .with_facility("H", FacilityKind::Hospital);
        (network, context)
    }

    #[test]
    fn result_is_a_forest() {
        let (network, context) = district();
        let forest = population_weighted_mst(&network, &context, MstWeights::default());
        assert_forest(&network, &forest);
        assert_eq!(forest.metrics.component_count, 2);
        assert_eq!(forest.len(), 3);
    }

    #[test]
    fn dense_pairs_are_preferred() {
        let (network, context) = district();
        let forest = population_weighted_mst(&network, &context, MstWeights::default());
        // 1-3 has the combined population of a million, so its key collapses
        assert!(forest.edges.iter().any(|e| {
            let mut pair = [e.from.as_str(), e.to.as_str()];
            pair.sort_unstable();
            pair == ["1", "3"]
        }));
        assert!(forest.edges.iter().all(|e| e.modified_weight.is_some()));
    }

    #[test]
    fn metrics_count_touched_places() {
        let (network, context) = district();
        let forest = population_weighted_mst(&network, &context, MstWeights::default());
        let metrics = &forest.metrics;
        assert_eq!(metrics.node_count, 5);
        assert!((metrics.covered_population - 1_110_000.0).abs() < 1e-6);
        assert!((metrics.population_coverage_percent - 100.0).abs() < 1e-9);
        assert_eq!(metrics.critical_facilities_count, 1);
        assert_eq!(metrics.covered_facilities, 1);
        assert!((metrics.average_node_degree - 1.2).abs() < 1e-9);
    }

    #[test]
    fn modified_weight_rewards_population_and_facilities() {
        let weights = MstWeights::default();
        let plain = weights.modified_weight(1000.0, 0.0, false);
        assert!((plain - 1000.0).abs() < 1e-9);
        let busy = weights.modified_weight(1000.0, 2_000_000.0, false);
        assert!((busy - 300.0).abs() < 1e-9);
        let critical = weights.modified_weight(1000.0, 0.0, true);
        assert!((critical - 850.0).abs() < 1e-9);
    }

    #[test]
    fn costly_hospital_link_still_joins_the_forest() {
        let mut network = NetworkGraph::new();
        let a = network.add_place(place("1", 31.00, 30.00));
        let b = network.add_place(place("2", 31.02, 30.00));
        let h = network.add_place(place("H", 31.04, 30.00));
        network.add_link(a, b, Link::road(500.0, 2000.0, 7.0));
        network.add_link(b, h, Link::road(4900.0, 2000.0, 7.0));
        let context = PlanningContext::from_graph(&network)
            .with_population("1", 800_000.0)
            .with_population("2", 800_000.0)
            .with_facility("H", FacilityKind::Hospital);

        let forest = population_weighted_mst(&network, &context, MstWeights::default());
        assert_forest(&network, &forest);
        assert_eq!(forest.len(), 2);
        assert!(forest.edges.iter().any(|e| e.from == "H" || e.to == "H"));
        assert_eq!(forest.metrics.covered_facilities, 1);
    }

    #[test]
    fn geojson_has_one_feature_per_link() {
        let (network, context) = district();
        let forest = population_weighted_mst(&network, &context, MstWeights::default());
        let collection = forest.to_geojson(&network).unwrap();
        assert_eq!(collection.features.len(), forest.len());
    }
}
