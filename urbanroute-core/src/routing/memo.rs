use std::collections::VecDeque;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use log::trace;
use petgraph::graph::NodeIndex;
use serde::Deserialize;

use super::dijkstra::dijkstra;
use super::path::RoutePath;
use super::query::validate_endpoints;
use super::weights::EdgeFilter;
use crate::QueryError;
use crate::model::{NetworkGraph, TimePeriod, TrafficTable, TransportMode};

type CacheKey = (NodeIndex, NodeIndex, TimePeriod);

/// How many planned paths a [`PathMemoizer`] keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Keep everything; each key is computed at most once.
    #[default]
    Unbounded,
    /// Keep at most this many paths, evicting the oldest insertion first.
    Bounded(usize),
}

/// Caller-owned cache of car paths keyed by endpoints and time period.
///
/// Nothing is invalidated automatically: call [`PathMemoizer::clear`] or
/// drop the memoizer when the network or traffic table changes. Not meant
/// to be shared between concurrent requests.
#[derive(Debug, Default)]
pub struct PathMemoizer {
    policy: CachePolicy,
    entries: HashMap<CacheKey, RoutePath>,
    insertion_order: VecDeque<CacheKey>,
    computations: usize,
    hits: usize,
}

impl PathMemoizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CachePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Returns the cached car path for the key, planning it on a miss.
    ///
    /// Planning skips links longer than 50 km.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if the endpoints are rejected. Rejected
    /// queries are never cached.
    pub fn get_or_compute(
        &mut self,
        network: &NetworkGraph,
        traffic: &TrafficTable,
        start: NodeIndex,
        end: NodeIndex,
        period: TimePeriod,
    ) -> Result<RoutePath, QueryError> {
        let key = (start, end, period);
        if let Some(path) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(path.clone());
        }

        validate_endpoints(network, start, end, TransportMode::Car)?;
        let path = dijkstra(
            network,
            traffic,
            start,
            end,
            TransportMode::Car,
            period,
            EdgeFilter::PATH_PLANNER,
        );
        self.computations += 1;
        trace!(
            "Planned {} -> {} ({period}), cache holds {}",
            network.place_id(start),
            network.place_id(end),
            self.entries.len() + 1
        );
        self.insert(key, path.clone());
        Ok(path)
    }

    /// Same as [`PathMemoizer::get_or_compute`] with place ids.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] for identical, unknown or unserved endpoints
    pub fn get_or_compute_by_id(
        &mut self,
        network: &NetworkGraph,
        traffic: &TrafficTable,
        from: &str,
        to: &str,
        period: TimePeriod,
    ) -> Result<RoutePath, QueryError> {
        if from.trim() == to.trim() {
            return Err(QueryError::SameEndpoints);
        }
        let start = network.lookup(from.trim())?;
        let end = network.lookup(to.trim())?;
        self.get_or_compute(network, traffic, start, end, period)
    }

    fn insert(&mut self, key: CacheKey, path: RoutePath) {
        if let CachePolicy::Bounded(capacity) = self.policy {
            if capacity == 0 {
                return;
            }
            while self.entries.len() >= capacity {
                let Some(oldest) = self.insertion_order.pop_front() else {
                    break;
                };
                self.entries.remove(&oldest);
            }
        }
        if let Entry::Vacant(entry) = self.entries.entry(key) {
            entry.insert(path);
            self.insertion_order.push_back(key);
        }
    }

    /// Number of searches actually run.
    pub fn computations(&self) -> usize {
        self.computations
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Drops every cached path. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }
}
