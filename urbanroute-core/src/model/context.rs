//! Read-only lookup tables derived from the network for planning algorithms

use hashbrown::HashMap;

use super::{FacilityKind, NetworkGraph};

/// Population and facility classification by place id.
///
/// Built once per network snapshot and passed explicitly to the algorithms
/// that weigh places by who lives or works there.
#[derive(Debug, Clone, Default)]
pub struct PlanningContext {
    population: HashMap<String, f64>,
    facilities: HashMap<String, FacilityKind>,
}

impl PlanningContext {
    pub fn from_graph(network: &NetworkGraph) -> Self {
        let mut context = Self::default();
        for (_, place) in network.places() {
            if let Some(population) = place.population {
                context.population.insert(place.id.clone(), population);
            }
            if let Some(kind) = place.facility {
                context.facilities.insert(place.id.clone(), kind);
            }
        }
        context
    }

    pub fn with_population(mut self, id: &str, population: f64) -> Self {
        self.population.insert(id.to_string(), population);
        self
    }

    pub fn with_facility(mut self, id: &str, kind: FacilityKind) -> Self {
        self.facilities.insert(id.to_string(), kind);
        self
    }

    pub fn population(&self, id: &str) -> f64 {
        self.population.get(id).copied().unwrap_or(0.0)
    }

    pub fn total_population(&self) -> f64 {
        self.population.values().sum()
    }

    pub fn facility(&self, id: &str) -> Option<FacilityKind> {
        self.facilities.get(id).copied()
    }

    pub fn is_critical(&self, id: &str) -> bool {
        self.facility(id).is_some_and(FacilityKind::is_critical)
    }

    pub fn is_important(&self, id: &str) -> bool {
        self.facility(id).is_some_and(FacilityKind::is_important)
    }

    /// Ids of critical facilities, sorted for deterministic processing.
    pub fn critical_facilities(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .facilities
            .iter()
            .filter(|(_, kind)| kind.is_critical())
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}
