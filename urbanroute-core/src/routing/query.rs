use chrono::NaiveTime;
use petgraph::graph::NodeIndex;
use serde::Deserialize;

use crate::QueryError;
use crate::model::{NetworkGraph, TimePeriod, TransportMode};

/// A point-to-point routing request by place id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteQuery {
    pub from: String,
    pub to: String,
    pub mode: TransportMode,
    #[serde(default = "default_period")]
    pub period: TimePeriod,
    /// Clock time of departure; takes precedence over `period`
    #[serde(default)]
    pub time: Option<NaiveTime>,
}

fn default_period() -> TimePeriod {
    TimePeriod::Morning
}

/// Endpoints of a query that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedQuery {
    pub start: NodeIndex,
    pub end: NodeIndex,
    pub mode: TransportMode,
    pub period: TimePeriod,
}

impl RouteQuery {
    pub fn new(from: &str, to: &str, mode: TransportMode, period: TimePeriod) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            mode,
            period,
            time: None,
        }
    }

    pub fn at(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Period the search runs in.
    pub fn period(&self) -> TimePeriod {
        self.period.or_from_time(self.time)
    }

    /// Checks the request against the network before any search runs.
    ///
    /// # Errors
    ///
    /// Rejects identical endpoints, unknown place ids, a mode with no
    /// eligible places, and endpoints the mode does not serve.
    pub fn validate(&self, network: &NetworkGraph) -> Result<ValidatedQuery, QueryError> {
        if self.from.trim() == self.to.trim() {
            return Err(QueryError::SameEndpoints);
        }
        let start = network.lookup(self.from.trim())?;
        let end = network.lookup(self.to.trim())?;
        validate_endpoints(network, start, end, self.mode)?;
        Ok(ValidatedQuery {
            start,
            end,
            mode: self.mode,
            period: self.period(),
        })
    }
}

/// Validation for callers that already hold node indices.
pub(crate) fn validate_endpoints(
    network: &NetworkGraph,
    start: NodeIndex,
    end: NodeIndex,
    mode: TransportMode,
) -> Result<(), QueryError> {
    if start == end {
        return Err(QueryError::SameEndpoints);
    }
    for node in [start, end] {
        if node.index() >= network.node_count() {
            return Err(QueryError::UnknownPlace(format!("#{}", node.index())));
        }
    }
    if network.eligible_places(mode).is_empty() {
        return Err(QueryError::NoEligiblePlaces(mode));
    }
    for node in [start, end] {
        if !network.serves(node, mode) {
            return Err(QueryError::NotServedByMode {
                place: network.place_id(node).to_string(),
                mode,
            });
        }
    }
    Ok(())
}
