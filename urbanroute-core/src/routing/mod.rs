//! Traffic-aware route search over the network
//!
//! All variants share one label-correcting search loop and price links
//! through the [`weights`] model.

pub mod astar;
pub mod dijkstra;
pub mod memo;
pub mod mixed;
pub mod path;
pub mod query;
mod search;
mod state;
pub mod weights;

pub use astar::{astar_emergency, emergency_route, heuristic_minutes};
pub use dijkstra::{dijkstra, road_distances, shortest_path};
pub use memo::{CachePolicy, PathMemoizer};
pub use mixed::{MODE_SWITCH_PENALTY, ModeComparison, compare_modes, mixed_mode, mixed_mode_route};
pub use path::RoutePath;
pub use query::{RouteQuery, ValidatedQuery};
pub use weights::{EdgeFilter, edge_weight, link_minutes, traffic_factor};
