//! Network components - places (nodes) and links (edges)

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::Meters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    Neighborhood,
    Facility,
    BusStop,
    MetroStation,
}

/// Facility subtype parsed from the free-text type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    Hospital,
    Medical,
    School,
    Government,
    Police,
    Fire,
    Airport,
    Other,
}

impl FacilityKind {
    /// Keyword match on the raw type, e.g. "Medical Center" or "Fire Station".
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        let keywords = [
            ("hospital", FacilityKind::Hospital),
            ("medical", FacilityKind::Medical),
            ("school", FacilityKind::School),
            ("university", FacilityKind::School),
            ("government", FacilityKind::Government),
            ("police", FacilityKind::Police),
            ("fire", FacilityKind::Fire),
            ("airport", FacilityKind::Airport),
        ];
        keywords
            .into_iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map_or(FacilityKind::Other, |(_, kind)| kind)
    }

    /// Facilities whose connectivity the population-weighted tree protects.
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            FacilityKind::Hospital
                | FacilityKind::Medical
                | FacilityKind::Government
                | FacilityKind::Airport
                | FacilityKind::Police
                | FacilityKind::Fire
        )
    }

    /// Facilities prioritized by the connectivity tree.
    pub fn is_important(self) -> bool {
        matches!(
            self,
            FacilityKind::Hospital
                | FacilityKind::School
                | FacilityKind::Government
                | FacilityKind::Police
                | FacilityKind::Fire
        )
    }

    /// Valid endpoints for emergency dispatch.
    pub fn is_medical(self) -> bool {
        matches!(self, FacilityKind::Hospital | FacilityKind::Medical)
    }
}

/// Graph node
#[derive(Debug, Clone)]
pub struct Place {
    pub id: String,
    pub name: String,
    /// Longitude/latitude in degrees
    pub geometry: Point<f64>,
    pub kind: PlaceKind,
    pub population: Option<f64>,
    pub facility: Option<FacilityKind>,
    /// District type of neighborhoods (residential, mixed, ...)
    pub district: Option<String>,
}

impl Place {
    pub fn population(&self) -> f64 {
        self.population.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadType {
    Existing,
    Potential,
    Bus,
    Metro,
    VirtualConnection,
    VirtualLink,
}

impl RoadType {
    pub const ALL: [RoadType; 6] = [
        RoadType::Existing,
        RoadType::Potential,
        RoadType::Bus,
        RoadType::Metro,
        RoadType::VirtualConnection,
        RoadType::VirtualLink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoadType::Existing => "existing",
            RoadType::Potential => "potential",
            RoadType::Bus => "bus",
            RoadType::Metro => "metro",
            RoadType::VirtualConnection => "virtual_connection",
            RoadType::VirtualLink => "virtual_link",
        }
    }

    /// Physical or synthetic road usable by private vehicles.
    pub fn is_road(self) -> bool {
        !matches!(self, RoadType::Bus | RoadType::Metro)
    }
}

/// Public transport service running over a link
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum ServiceLine {
    Bus { route_id: String, buses_assigned: u32 },
    Metro { line_id: String },
}

/// Graph edge. Topology is undirected, traversal cost is computed per
/// direction by the weight model.
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub distance: Meters,
    /// Vehicles (roads) or passengers (transit) per hour
    pub capacity: f64,
    /// 1 (worst) to 10 (best)
    pub condition: f64,
    pub road_type: RoadType,
    /// Million currency units, zero for anything already built
    pub construction_cost: f64,
    pub service: Option<ServiceLine>,
}

impl Link {
    pub fn road(distance: Meters, capacity: f64, condition: f64) -> Self {
        Self {
            distance,
            capacity,
            condition,
            road_type: RoadType::Existing,
            construction_cost: 0.0,
            service: None,
        }
    }

    pub fn potential(distance: Meters, capacity: f64, construction_cost: f64) -> Self {
        Self {
            distance,
            capacity,
            condition: 10.0,
            road_type: RoadType::Potential,
            construction_cost,
            service: None,
        }
    }

    pub fn bus(distance: Meters, capacity: f64, route_id: &str, buses_assigned: u32) -> Self {
        Self {
            distance,
            capacity,
            condition: 7.0,
            road_type: RoadType::Bus,
            construction_cost: 0.0,
            service: Some(ServiceLine::Bus {
                route_id: route_id.to_string(),
                buses_assigned,
            }),
        }
    }

    pub fn metro(distance: Meters, capacity: f64, line_id: &str) -> Self {
        Self {
            distance,
            capacity,
            condition: 8.0,
            road_type: RoadType::Metro,
            construction_cost: 0.0,
            service: Some(ServiceLine::Metro {
                line_id: line_id.to_string(),
            }),
        }
    }

    /// Synthetic link; carries no capacity so traffic never applies to it.
    pub fn virtual_edge(road_type: RoadType, distance: Meters) -> Self {
        let condition = if road_type == RoadType::VirtualLink {
            10.0
        } else {
            8.0
        };
        Self {
            distance,
            capacity: 0.0,
            condition,
            road_type,
            construction_cost: 0.0,
            service: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facility_kind_matches_keywords() {
        assert_eq!(FacilityKind::parse("Hospital"), FacilityKind::Hospital);
        assert_eq!(FacilityKind::parse(" Medical Center "), FacilityKind::Medical);
        assert_eq!(FacilityKind::parse("Fire Station"), FacilityKind::Fire);
        assert_eq!(FacilityKind::parse("International Airport"), FacilityKind::Airport);
        assert_eq!(FacilityKind::parse("Sports Club"), FacilityKind::Other);
    }

    #[test]
    fn critical_and_important_sets_differ() {
        assert!(FacilityKind::Airport.is_critical());
        assert!(!FacilityKind::Airport.is_important());
        assert!(FacilityKind::School.is_important());
        assert!(!FacilityKind::School.is_critical());
    }

    #[test]
    fn transit_links_are_not_roads() {
        assert!(!RoadType::Bus.is_road());
        assert!(!RoadType::Metro.is_road());
        assert!(RoadType::VirtualLink.is_road());
    }
}
