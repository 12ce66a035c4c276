//! Data model for the multi-modal urban network
//!
//! Places and links live in an arena-indexed petgraph multigraph owned by
//! [`NetworkGraph`]; everything else reads it through shared references.

pub mod context;
pub mod geometry;
pub mod mode;
pub mod network;
pub mod traffic;
pub mod urban_model;

pub use context::PlanningContext;
pub use mode::TransportMode;
pub use network::{
    BuildReport, FacilityKind, Link, NetworkGraph, Place, PlaceKind, RoadType, ServiceLine,
};
pub use traffic::{TimePeriod, TrafficTable};
pub use urban_model::UrbanModel;
