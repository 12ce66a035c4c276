//! Routing and network planning engine for multi-modal urban transport.
//!
//! The crate turns tabular city data (neighborhoods, facilities, roads, bus
//! routes, metro lines, traffic counts) into a [`NetworkGraph`] and runs the
//! planning algorithms on top of it: traffic-aware shortest paths, emergency
//! A*, mixed-mode search, memoized path planning, constrained spanning
//! trees, maintenance budgeting and fleet sizing.

pub mod algo;
mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

pub use error::{Error, QueryError};
pub use loading::{DatasetConfig, create_urban_model, load_dataset};
pub use model::{
    NetworkGraph, PlanningContext, TimePeriod, TrafficTable, TransportMode, UrbanModel,
};

/// Distance in meters
pub type Meters = f64;
/// Travel time in minutes
pub type Minutes = f64;
/// Identifier of a place as it appears in the source tables
pub type PlaceId = String;

/// Edges longer than this are rejected while the network is built.
pub const MAX_EDGE_DISTANCE: Meters = 100_000.0;
/// Edge length cap applied by the memoized path planner.
pub const PLANNER_MAX_EDGE_DISTANCE: Meters = 50_000.0;
