use std::collections::BinaryHeap;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use petgraph::graph::{EdgeIndex, NodeIndex};

use super::path::RoutePath;
use super::state::State;
use crate::Minutes;
use crate::model::{NetworkGraph, TransportMode};

type Predecessor = (NodeIndex, EdgeIndex, TransportMode);

/// Label-correcting best-first search shared by every routing variant.
///
/// `price` returns the cost of leaving `from` over `edge` together with the
/// mode that hop is taken in, given the mode used to reach `from` (`None` at
/// the start). `heuristic` adds a goal estimate to the queue priority; pass
/// `|_| 0.0` for plain Dijkstra. The search stops once `end` is popped.
pub(super) fn label_search<P, H>(
    network: &NetworkGraph,
    start: NodeIndex,
    end: NodeIndex,
    price: P,
    heuristic: H,
) -> RoutePath
where
    P: Fn(EdgeIndex, NodeIndex, Option<TransportMode>) -> Option<(Minutes, TransportMode)>,
    H: Fn(NodeIndex) -> Minutes,
{
    let estimated_nodes = network.node_count().min(1024);
    let mut costs: HashMap<NodeIndex, Minutes> = HashMap::with_capacity(estimated_nodes);
    let mut previous: HashMap<NodeIndex, Predecessor> = HashMap::with_capacity(estimated_nodes);
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    costs.insert(start, 0.0);
    heap.push(State {
        priority: heuristic(start),
        cost: 0.0,
        node: start,
    });

    let mut settled = 0usize;
    while let Some(State { cost, node, .. }) = heap.pop() {
        if node == end {
            break;
        }

        // Skip if we've found a better path
        if costs.get(&node).is_some_and(|&best| cost > best) {
            continue;
        }
        settled += 1;

        let arrival_mode = previous.get(&node).map(|&(_, _, mode)| mode);
        for (edge, next, _) in network.incident_links(node) {
            let Some((weight, mode)) = price(edge, node, arrival_mode) else {
                continue;
            };
            let next_cost = cost + weight;
            let improved = match costs.entry(next) {
                Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    true
                }
                Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        true
                    } else {
                        false
                    }
                }
            };
            if improved {
                previous.insert(next, (node, edge, mode));
                heap.push(State {
                    priority: next_cost + heuristic(next),
                    cost: next_cost,
                    node: next,
                });
            }
        }
    }
    log::trace!(
        "Search {} -> {} expanded {settled} places",
        network.place_id(start),
        network.place_id(end)
    );

    reconstruct(network, start, end, &costs, &previous)
}

fn reconstruct(
    network: &NetworkGraph,
    start: NodeIndex,
    end: NodeIndex,
    costs: &HashMap<NodeIndex, Minutes>,
    previous: &HashMap<NodeIndex, Predecessor>,
) -> RoutePath {
    let Some(&travel_time) = costs.get(&end) else {
        return RoutePath::unreachable();
    };
    if start == end {
        return RoutePath::unreachable();
    }

    let mut hops = Vec::new();
    let mut current = end;
    while current != start {
        let Some(&(prev, edge, mode)) = previous.get(&current) else {
            return RoutePath::unreachable();
        };
        hops.push((edge, current, mode));
        current = prev;
    }
    hops.reverse();

    RoutePath::from_hops(network, start, &hops, travel_time)
}
