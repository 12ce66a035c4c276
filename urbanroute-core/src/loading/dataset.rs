use log::info;
use serde::de::DeserializeOwned;

use super::config::DatasetConfig;
use super::parser::deserialize_csv_file;
use super::records::{
    BusRouteRecord, DemandRecord, ExistingRoadRecord, FacilityRecord, MetroLineRecord,
    NeighborhoodRecord, PotentialRoadRecord, TrafficFlowRecord,
};
use crate::{Error, TrafficTable};

/// All raw tables of one dataset snapshot.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub neighborhoods: Vec<NeighborhoodRecord>,
    pub facilities: Vec<FacilityRecord>,
    pub existing_roads: Vec<ExistingRoadRecord>,
    pub potential_roads: Vec<PotentialRoadRecord>,
    pub bus_routes: Vec<BusRouteRecord>,
    pub metro_lines: Vec<MetroLineRecord>,
    pub demand: Vec<DemandRecord>,
    pub traffic: TrafficTable,
    /// Rows dropped because they could not be parsed
    pub rejected_rows: usize,
}

/// Loads every table named by the configuration.
///
/// # Errors
///
/// Returns an error if the directory or a mandatory table is missing, or a
/// file cannot be read. Malformed rows are skipped, not fatal.
pub fn load_dataset(config: &DatasetConfig) -> Result<Dataset, Error> {
    validate_config(config)?;
    info!("Loading dataset from {}", config.dir().display());

    let mut dataset = Dataset::default();
    dataset.neighborhoods = read_table(config, &config.neighborhoods, &mut dataset.rejected_rows)?;
    dataset.facilities = read_table(config, &config.facilities, &mut dataset.rejected_rows)?;
    dataset.existing_roads = read_table(config, &config.existing_roads, &mut dataset.rejected_rows)?;
    dataset.potential_roads =
        read_table(config, &config.potential_roads, &mut dataset.rejected_rows)?;
    dataset.bus_routes = read_table(config, &config.bus_routes, &mut dataset.rejected_rows)?;
    dataset.metro_lines = read_table(config, &config.metro_lines, &mut dataset.rejected_rows)?;
    dataset.demand = read_optional_table(config, &config.public_demand, &mut dataset.rejected_rows)?;

    let traffic_rows: Vec<TrafficFlowRecord> =
        read_optional_table(config, &config.traffic_flow, &mut dataset.rejected_rows)?;
    dataset.traffic = TrafficTable::from_records(&traffic_rows);

    info!(
        "Loaded {} neighborhoods, {} facilities, {} existing and {} potential roads, \
         {} bus routes, {} metro lines, {} demand pairs, {} traffic pairs ({} rows skipped)",
        dataset.neighborhoods.len(),
        dataset.facilities.len(),
        dataset.existing_roads.len(),
        dataset.potential_roads.len(),
        dataset.bus_routes.len(),
        dataset.metro_lines.len(),
        dataset.demand.len(),
        dataset.traffic.len(),
        dataset.rejected_rows
    );
    Ok(dataset)
}

fn validate_config(config: &DatasetConfig) -> Result<(), Error> {
    if !config.dir().is_dir() {
        return Err(Error::InvalidData(format!(
            "Dataset directory not found: {}",
            config.dir().display()
        )));
    }

    for (table, file) in config.required_tables() {
        let path = config.path(file);
        if !path.exists() {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{table} table not found: {}", path.display()),
            )));
        }
    }

    Ok(())
}

fn read_table<T: DeserializeOwned>(
    config: &DatasetConfig,
    file: &str,
    rejected: &mut usize,
) -> Result<Vec<T>, Error> {
    let (rows, skipped) = deserialize_csv_file(&config.path(file))?;
    *rejected += skipped;
    Ok(rows)
}

fn read_optional_table<T: DeserializeOwned>(
    config: &DatasetConfig,
    file: &str,
    rejected: &mut usize,
) -> Result<Vec<T>, Error> {
    let path = config.path(file);
    if !path.exists() {
        log::debug!("Optional table {} is absent", path.display());
        return Ok(Vec::new());
    }
    read_table(config, file, rejected)
}
