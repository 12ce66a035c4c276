//! Travel time of a single link for a given mode and time of day.
//!
//! Every search variant prices edges through [`edge_weight`], so road-type
//! rules, traffic adjustment and speed tables live in one place.

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::model::{Link, NetworkGraph, TimePeriod, TrafficTable, TransportMode};
use crate::{Meters, Minutes, PLANNER_MAX_EDGE_DISTANCE};

pub const MIN_TRAFFIC_FACTOR: f64 = 0.5;
pub const MAX_TRAFFIC_FACTOR: f64 = 1.5;

/// Congestion multiplier: observed flow over capacity, clamped.
///
/// A missing observation means the road runs exactly at capacity. Links
/// without capacity (virtual links) are never congested.
pub fn traffic_factor(flow: Option<f64>, capacity: f64) -> f64 {
    if capacity <= 0.0 {
        return 1.0;
    }
    let factor = flow.unwrap_or(capacity) / capacity;
    if factor.is_nan() {
        1.0
    } else {
        factor.clamp(MIN_TRAFFIC_FACTOR, MAX_TRAFFIC_FACTOR)
    }
}

/// Minutes needed to cross `link` in `mode`, or `None` if the mode may not
/// use it.
pub fn link_minutes(link: &Link, mode: TransportMode, flow: Option<f64>) -> Option<Minutes> {
    if !mode.allows(link.road_type) {
        return None;
    }
    let speed = if mode.is_traffic_sensitive() {
        mode.base_speed_kmh() / traffic_factor(flow, link.capacity)
    } else {
        mode.base_speed_kmh()
    };
    Some(link.distance / 1000.0 / speed * 60.0)
}

/// Travel time over `edge` leaving from `from`, with the flow looked up for
/// that direction of travel.
pub fn edge_weight(
    network: &NetworkGraph,
    traffic: &TrafficTable,
    edge: EdgeIndex,
    from: NodeIndex,
    mode: TransportMode,
    period: TimePeriod,
) -> Option<Minutes> {
    let to = network.other_end(edge, from)?;
    let link = network.link(edge);
    let flow = if mode.is_traffic_sensitive() {
        traffic.flow(period, network.place_id(from), network.place_id(to))
    } else {
        None
    };
    link_minutes(link, mode, flow)
}

/// Extra restrictions on which links a search may consider, on top of the
/// mode's own road-type rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeFilter {
    pub max_distance: Option<Meters>,
}

impl EdgeFilter {
    pub const NONE: EdgeFilter = EdgeFilter {
        max_distance: None,
    };

    /// The memoized path planner avoids detours over links longer than 50 km.
    pub const PATH_PLANNER: EdgeFilter = EdgeFilter {
        max_distance: Some(PLANNER_MAX_EDGE_DISTANCE),
    };

    pub fn admits(&self, link: &Link) -> bool {
        self.max_distance
            .is_none_or(|max_distance| link.distance <= max_distance)
    }
}

impl Default for EdgeFilter {
    fn default() -> Self {
        Self::NONE
    }
}
