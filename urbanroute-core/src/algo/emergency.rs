//! Delay an emergency run inflicts on a concurrent regular trip.

use hashbrown::HashSet;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::model::NetworkGraph;
use crate::routing::RoutePath;
use crate::{Meters, Minutes};

/// Tunable constants of the delay model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayParameters {
    /// Share of each shared road's length lost to the emergency vehicle
    pub overlap_factor: f64,
    /// Share of the whole trip lost when the paths never meet
    pub ambient_factor: f64,
    /// Upper bound on the delay as a share of the trip length
    pub max_share: f64,
}

impl Default for DelayParameters {
    fn default() -> Self {
        Self {
            overlap_factor: 0.2,
            ambient_factor: 0.03,
            max_share: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DelaySource {
    /// The paths share road segments
    Overlap,
    /// No usable shared road; ambient disruption only
    Ambient,
    /// The regular trip is empty
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelayEstimate {
    /// Place id pairs traversed by both paths, in regular-path order
    pub common_segments: Vec<(String, String)>,
    /// Extra distance-equivalent in meters
    pub delay_meters: Meters,
    /// The same delay at the regular trip's average speed
    pub delay_minutes: Minutes,
    pub source: DelaySource,
    pub capped: bool,
}

fn segment(a: NodeIndex, b: NodeIndex) -> (NodeIndex, NodeIndex) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Estimates the delay for `regular` caused by `emergency`.
///
/// Each segment both paths traverse (in either direction) costs
/// `overlap_factor` of the first road link between its places. Without any
/// such cost the trip still loses `ambient_factor` of its length.
pub fn emergency_delay(
    network: &NetworkGraph,
    regular: &RoutePath,
    emergency: &RoutePath,
    parameters: DelayParameters,
) -> DelayEstimate {
    if regular.is_empty() {
        return DelayEstimate {
            common_segments: Vec::new(),
            delay_meters: 0.0,
            delay_minutes: 0.0,
            source: DelaySource::None,
            capped: false,
        };
    }

    let emergency_segments: HashSet<(NodeIndex, NodeIndex)> = emergency
        .node_indices
        .windows(2)
        .map(|w| segment(w[0], w[1]))
        .collect();

    let mut common_segments = Vec::new();
    let mut overlap: Meters = 0.0;
    for hop in regular.node_indices.windows(2) {
        let (a, b) = (hop[0], hop[1]);
        if !emergency_segments.contains(&segment(a, b)) {
            continue;
        }
        common_segments.push((
            network.place_id(a).to_string(),
            network.place_id(b).to_string(),
        ));
        let road = network
            .links_between(a, b)
            .filter(|(_, link)| link.road_type.is_road())
            .min_by_key(|(edge, _)| *edge);
        if let Some((_, link)) = road {
            overlap += link.distance * parameters.overlap_factor;
        }
    }

    let (mut delay_meters, source) = if overlap > 0.0 {
        (overlap, DelaySource::Overlap)
    } else {
        (regular.distance * parameters.ambient_factor, DelaySource::Ambient)
    };

    let ceiling = regular.distance * parameters.max_share;
    let capped = delay_meters > ceiling;
    if capped {
        delay_meters = ceiling;
    }

    let delay_minutes = if regular.distance > 0.0 {
        delay_meters * regular.travel_time / regular.distance
    } else {
        0.0
    };

    log::debug!(
        "Emergency delay: {} shared segments, {delay_meters:.0} m, {delay_minutes:.2} min",
        common_segments.len()
    );
    DelayEstimate {
        common_segments,
        delay_meters,
        delay_minutes,
        source,
        capped,
    }
}
