use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Location of the dataset tables. File names are relative to `dir`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub dir: PathBuf,
    pub neighborhoods: String,
    pub facilities: String,
    pub existing_roads: String,
    pub potential_roads: String,
    pub bus_routes: String,
    pub metro_lines: String,
    /// Optional, missing file means no demand data
    pub public_demand: String,
    /// Optional, missing file means free-flowing traffic everywhere
    pub traffic_flow: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            neighborhoods: "neighborhoods.csv".to_string(),
            facilities: "facilities.csv".to_string(),
            existing_roads: "existing_roads.csv".to_string(),
            potential_roads: "potential_roads.csv".to_string(),
            bus_routes: "bus_routes.csv".to_string(),
            metro_lines: "metro_lines.csv".to_string(),
            public_demand: "public_demand.csv".to_string(),
            traffic_flow: "traffic_flow.csv".to_string(),
        }
    }
}

impl DatasetConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Tables that must be present for the network to make sense.
    pub(crate) fn required_tables(&self) -> [(&'static str, &str); 6] {
        [
            ("neighborhoods", &self.neighborhoods),
            ("facilities", &self.facilities),
            ("existing roads", &self.existing_roads),
            ("potential roads", &self.potential_roads),
            ("bus routes", &self.bus_routes),
            ("metro lines", &self.metro_lines),
        ]
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
