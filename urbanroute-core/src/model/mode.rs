//! Transport modes and their traversal rules

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RoadType;
use crate::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Car,
    Bus,
    Metro,
    Emergency,
}

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Car,
        TransportMode::Bus,
        TransportMode::Metro,
        TransportMode::Emergency,
    ];

    /// Whether a vehicle of this mode may use a link of the given type.
    ///
    /// Bus links are dedicated lanes: only buses run on them.
    pub fn allows(self, road_type: RoadType) -> bool {
        match self {
            TransportMode::Car | TransportMode::Emergency => road_type.is_road(),
            TransportMode::Bus => road_type == RoadType::Bus,
            TransportMode::Metro => road_type == RoadType::Metro,
        }
    }

    /// Free-flow speed in km/h.
    pub fn base_speed_kmh(self) -> f64 {
        match self {
            TransportMode::Car => 120.0,
            TransportMode::Bus | TransportMode::Emergency => 100.0,
            TransportMode::Metro => 90.0,
        }
    }

    /// Metro runs on its own right of way and ignores road traffic.
    pub fn is_traffic_sensitive(self) -> bool {
        !matches!(self, TransportMode::Metro)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Car => "car",
            TransportMode::Bus => "bus",
            TransportMode::Metro => "metro",
            TransportMode::Emergency => "emergency",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(TransportMode::Car),
            "bus" => Ok(TransportMode::Bus),
            "metro" => Ok(TransportMode::Metro),
            "emergency" => Ok(TransportMode::Emergency),
            _ => Err(QueryError::UnknownMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_links_are_reserved_for_buses() {
        assert!(!TransportMode::Car.allows(RoadType::Bus));
        assert!(!TransportMode::Emergency.allows(RoadType::Bus));
        assert!(TransportMode::Bus.allows(RoadType::Bus));
        assert!(!TransportMode::Bus.allows(RoadType::Existing));
    }

    #[test]
    fn metro_only_uses_metro_links() {
        for road_type in RoadType::ALL {
            assert_eq!(
                TransportMode::Metro.allows(road_type),
                road_type == RoadType::Metro
            );
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" Metro ".parse::<TransportMode>(), Ok(TransportMode::Metro));
        assert!(matches!(
            "bike".parse::<TransportMode>(),
            Err(QueryError::UnknownMode(_))
        ));
    }
}
