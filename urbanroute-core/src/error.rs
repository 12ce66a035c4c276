use thiserror::Error;

use crate::TransportMode;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryError),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}

/// Rejections raised before any search runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("start and end must be different places")]
    SameEndpoints,
    #[error("unknown place '{0}'")]
    UnknownPlace(String),
    #[error("no places are served by {0} mode")]
    NoEligiblePlaces(TransportMode),
    #[error("place '{place}' is not served by {mode} mode")]
    NotServedByMode { place: String, mode: TransportMode },
    #[error("emergency trips must start or end at a hospital or medical facility")]
    NoMedicalEndpoint,
    #[error("unknown time period '{0}'")]
    UnknownTimePeriod(String),
    #[error("unknown transport mode '{0}'")]
    UnknownMode(String),
}
