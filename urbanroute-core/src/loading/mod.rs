//! This module is responsible for loading the tabular city data and
//! building the multi-modal network from it.

mod builder;
mod config;
mod dataset;
mod parser;
mod records;

pub use builder::{build_network, create_urban_model};
pub use config::DatasetConfig;
pub use dataset::{Dataset, load_dataset};
pub use parser::{deserialize_csv_file, deserialize_csv_reader};
pub use records::{
    BusRouteRecord, DemandRecord, ExistingRoadRecord, FacilityRecord, MetroLineRecord,
    NeighborhoodRecord, PotentialRoadRecord, TrafficFlowRecord,
};
