//! Planning algorithms on top of the built network.
//!
//! Each entry point takes the network by shared reference and returns an
//! owned, serializable result.

pub mod bus_routes;
pub mod emergency;
pub mod interchange;
pub mod maintenance;
pub mod mst;
pub mod schedule;

pub use bus_routes::{BusRouteReview, DemandSuggestion, analyze_bus_routes};
pub use emergency::{DelayEstimate, DelayParameters, DelaySource, emergency_delay};
pub use interchange::{Interchange, recommend_interchanges};
pub use maintenance::{
    KnapsackItem, KnapsackSolution, MaintenanceCandidate, MaintenancePlan, allocate_maintenance,
    solve_knapsack,
};
pub use mst::{
    ForestEdge, ForestMetrics, MstWeights, SpanningForest, budget_constrained_mst,
    connectivity_mst, population_weighted_mst,
};
pub use schedule::{LineSchedule, PeriodService, TransitSchedule, optimize_schedule};
