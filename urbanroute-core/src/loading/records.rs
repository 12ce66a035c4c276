//! Raw table rows as they appear in the source spreadsheets

use serde::{Deserialize, Serialize};

use super::parser::{deserialize_id, split_ids};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodRecord {
    #[serde(rename = "ID", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Population")]
    pub population: f64,
    #[serde(rename = "Type")]
    pub district_type: String,
    #[serde(rename = "X-coordinate")]
    pub x: f64,
    #[serde(rename = "Y-coordinate")]
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityRecord {
    #[serde(rename = "ID", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub facility_type: String,
    #[serde(rename = "X-coordinate", default, deserialize_with = "csv::invalid_option")]
    pub x: Option<f64>,
    #[serde(rename = "Y-coordinate", default, deserialize_with = "csv::invalid_option")]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingRoadRecord {
    #[serde(rename = "FromID", deserialize_with = "deserialize_id")]
    pub from_id: String,
    #[serde(rename = "ToID", deserialize_with = "deserialize_id")]
    pub to_id: String,
    #[serde(rename = "Distance(km)")]
    pub distance_km: f64,
    #[serde(
        rename = "Current Capacity(vehicles/hour)",
        alias = "Current Capacity"
    )]
    pub capacity: f64,
    #[serde(rename = "Condition(1-10)", alias = "Condition")]
    pub condition: f64,
}

impl ExistingRoadRecord {
    pub fn road_id(&self) -> String {
        format!("{}-{}", self.from_id, self.to_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotentialRoadRecord {
    #[serde(rename = "FromID", deserialize_with = "deserialize_id")]
    pub from_id: String,
    #[serde(rename = "ToID", deserialize_with = "deserialize_id")]
    pub to_id: String,
    #[serde(rename = "Distance(km)")]
    pub distance_km: f64,
    #[serde(
        rename = "Estimated Capacity(vehicles/hour)",
        alias = "Estimated Capacity"
    )]
    pub capacity: f64,
    #[serde(
        rename = "Construction Cost(Million EGP)",
        alias = "Construction Cost"
    )]
    pub construction_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusRouteRecord {
    #[serde(rename = "RouteID", deserialize_with = "deserialize_id")]
    pub route_id: String,
    #[serde(rename = "Stops(comma-separated IDs)", alias = "Stops")]
    pub stops: String,
    #[serde(rename = "Buses Assigned")]
    pub buses_assigned: u32,
    #[serde(rename = "Daily Passengers")]
    pub daily_passengers: f64,
}

impl BusRouteRecord {
    pub fn stop_ids(&self) -> Vec<String> {
        split_ids(&self.stops)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetroLineRecord {
    #[serde(rename = "LineID", deserialize_with = "deserialize_id")]
    pub line_id: String,
    #[serde(rename = "Stations(comma-separated IDs)", alias = "Stations")]
    pub stations: String,
    #[serde(rename = "Daily Passengers")]
    pub daily_passengers: f64,
}

impl MetroLineRecord {
    pub fn station_ids(&self) -> Vec<String> {
        split_ids(&self.stations)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandRecord {
    #[serde(rename = "FromID", deserialize_with = "deserialize_id")]
    pub from_id: String,
    #[serde(rename = "ToID", deserialize_with = "deserialize_id")]
    pub to_id: String,
    #[serde(rename = "Daily Passengers")]
    pub daily_passengers: f64,
}

/// Hourly vehicle counts on a directed road, `road_id` formatted `From-To`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficFlowRecord {
    #[serde(rename = "RoadID")]
    pub road_id: String,
    #[serde(rename = "MorningPeak(veh/h)", alias = "MorningPeak")]
    pub morning: f64,
    #[serde(rename = "Afternoon(veh/h)", alias = "Afternoon")]
    pub afternoon: f64,
    #[serde(rename = "Evening Peak(veh/h)", alias = "EveningPeak")]
    pub evening: f64,
    #[serde(rename = "Night(veh/h)", alias = "Night")]
    pub night: f64,
}
