pub use crate::{MAX_EDGE_DISTANCE, PLANNER_MAX_EDGE_DISTANCE};

// Re-export key components
pub use crate::algo::{
    BusRouteReview, DelayEstimate, DelayParameters, MaintenancePlan, SpanningForest,
    TransitSchedule, allocate_maintenance, analyze_bus_routes, budget_constrained_mst,
    connectivity_mst, emergency_delay, optimize_schedule, population_weighted_mst,
    recommend_interchanges,
};
pub use crate::loading::{DatasetConfig, create_urban_model, load_dataset};
pub use crate::model::{
    FacilityKind, Link, NetworkGraph, Place, PlanningContext, RoadType, UrbanModel,
};
pub use crate::routing::{
    CachePolicy, ModeComparison, PathMemoizer, RoutePath, RouteQuery, compare_modes,
    emergency_route, mixed_mode_route, shortest_path,
};

// Query parameters
pub use crate::model::{TimePeriod, TransportMode};

// Units
pub use crate::Meters;
pub use crate::Minutes;
pub use crate::PlaceId;

pub use crate::{Error, QueryError};
