use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

/// Heap entry. `priority` orders the queue (cost plus any heuristic),
/// `cost` is the accumulated value used to detect stale entries.
#[derive(Copy, Clone, Debug)]
pub(super) struct State {
    pub(super) priority: f64,
    pub(super) cost: f64,
    pub(super) node: NodeIndex,
}

// Min-heap by priority (reversed from standard Rust BinaryHeap)
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority.total_cmp(&self.priority)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}
