use std::fs;
use std::path::Path;

use tempfile::TempDir;
use urbanroute_core::algo::{
    allocate_maintenance, budget_constrained_mst, optimize_schedule, population_weighted_mst,
    recommend_interchanges, MstWeights,
};
use urbanroute_core::prelude::*;
use urbanroute_core::routing::PathMemoizer;

const NEIGHBORHOODS: &str = "\
ID,Name,Population,Type,X-coordinate,Y-coordinate
1,Maadi,250000,Residential,31.25,29.96
2,Nasr City,500000,Mixed,31.34,30.06
3,Downtown,100000,Business,31.24,30.04
4,Heliopolis,200000,Residential,31.32,30.09
";

const FACILITIES: &str = "\
ID,Name,Type,X-coordinate,Y-coordinate
F1,Cairo International Airport,Airport,31.41,30.11
F9,Qasr El Aini Hospital,Medical,31.23,30.03
";

const EXISTING_ROADS: &str = "\
FromID,ToID,Distance(km),Current Capacity(vehicles/hour),Condition(1-10)
1,3,11.0,3000,7
3,2,14.0,4000,8
2,4,4.0,3000,7
4,F1,9.0,3000,9
3,F9,1.5,2000,6
1,2,250,3000,5
";

const POTENTIAL_ROADS: &str = "\
FromID,ToID,Distance(km),Estimated Capacity(vehicles/hour),Construction Cost(Million EGP)
1,4,20.0,3000,450
";

const BUS_ROUTES: &str = "\
RouteID,Stops(comma-separated IDs),Buses Assigned,Daily Passengers
B1,\"1,3,2\",20,35000
";

const METRO_LINES: &str = "\
LineID,Stations(comma-separated IDs),Daily Passengers
M1,\"3,2,4\",1500000
";

const DEMAND: &str = "\
FromID,ToID,Daily Passengers
1,3,15000
";

const TRAFFIC: &str = "\
RoadID,MorningPeak(veh/h),Afternoon(veh/h),Evening Peak(veh/h),Night(veh/h)
1-3,2800,1500,2600,800
";

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn city_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "neighborhoods.csv", NEIGHBORHOODS);
    write(dir.path(), "facilities.csv", FACILITIES);
    write(dir.path(), "existing_roads.csv", EXISTING_ROADS);
    write(dir.path(), "potential_roads.csv", POTENTIAL_ROADS);
    write(dir.path(), "bus_routes.csv", BUS_ROUTES);
    write(dir.path(), "metro_lines.csv", METRO_LINES);
    write(dir.path(), "public_demand.csv", DEMAND);
    write(dir.path(), "traffic_flow.csv", TRAFFIC);
    dir
}

fn city() -> (TempDir, UrbanModel) {
    let dir = city_dir();
    let model = create_urban_model(&DatasetConfig::new(dir.path())).unwrap();
    (dir, model)
}

#[test]
fn dataset_builds_a_connected_network() {
    let (_dir, model) = city();
    let report = &model.graph.report;
    assert_eq!(report.places, 6);
    assert_eq!(report.rejected_edges, 1);
    assert_eq!(report.virtual_connections, 0);
    assert_eq!(model.graph.bus_stops().len(), 3);
    assert_eq!(model.graph.metro_stations().len(), 3);
    assert_eq!(model.graph.medical_facilities().len(), 1);
    assert_eq!(model.dataset.demand.len(), 1);
    assert_eq!(model.traffic().len(), 1);
}

#[test]
fn missing_required_table_is_an_error() {
    let dir = city_dir();
    fs::remove_file(dir.path().join("metro_lines.csv")).unwrap();
    let result = create_urban_model(&DatasetConfig::new(dir.path()));
    assert!(matches!(result, Err(Error::IoError(_))));
}

#[test]
fn optional_tables_may_be_absent() {
    let dir = city_dir();
    fs::remove_file(dir.path().join("traffic_flow.csv")).unwrap();
    fs::remove_file(dir.path().join("public_demand.csv")).unwrap();
    let model = create_urban_model(&DatasetConfig::new(dir.path())).unwrap();
    assert!(model.traffic().is_empty());
    assert!(model.dataset.demand.is_empty());
}

#[test]
fn transit_routes_follow_their_lines() {
    let (_dir, model) = city();
    let traffic = model.traffic();

    let bus = RouteQuery::new("1", "2", TransportMode::Bus, TimePeriod::Morning);
    let bus = shortest_path(&model.graph, traffic, &bus).unwrap();
    assert_eq!(bus.nodes, vec!["1", "3", "2"]);
    assert!((bus.distance - 25_000.0).abs() < 1e-6);

    let metro = RouteQuery::new("3", "4", TransportMode::Metro, TimePeriod::Night);
    let metro = shortest_path(&model.graph, traffic, &metro).unwrap();
    assert_eq!(metro.nodes, vec!["3", "2", "4"]);
    assert!((metro.distance - 18_000.0).abs() < 1e-6);

    let outside = RouteQuery::new("1", "4", TransportMode::Metro, TimePeriod::Night);
    assert!(matches!(
        shortest_path(&model.graph, traffic, &outside),
        Err(QueryError::NotServedByMode { .. })
    ));
}

#[test]
fn car_route_travel_time_matches_weights() {
    let (_dir, model) = city();
    let traffic = model.traffic();
    let query = RouteQuery::new("1", "F1", TransportMode::Car, TimePeriod::Morning);
    let path = shortest_path(&model.graph, traffic, &query).unwrap();
    assert_eq!(path.nodes.first().map(String::as_str), Some("1"));
    assert_eq!(path.nodes.last().map(String::as_str), Some("F1"));
    let recomputed = path
        .recomputed_travel_time(&model.graph, traffic, TimePeriod::Morning)
        .unwrap();
    assert!((recomputed - path.travel_time).abs() < 1e-9);
    assert!(path.to_geojson(&model.graph).is_ok());
}

#[test]
fn emergency_and_comparison_queries() {
    let (_dir, model) = city();
    let traffic = model.traffic();
    let ambulance = emergency_route(&model.graph, traffic, "F9", "4", TimePeriod::Evening).unwrap();
    assert_eq!(ambulance.nodes.first().map(String::as_str), Some("F9"));
    assert!(ambulance.travel_time > 0.0);

    let comparison = compare_modes(&model.graph, traffic, "1", "2", TimePeriod::Afternoon).unwrap();
    assert!(!comparison.car.is_empty());
    assert!(!comparison.bus.is_empty());
    assert!(comparison.metro.is_empty());
    assert!(comparison.fastest().is_some());
}

#[test]
fn memoizer_reuses_planned_paths() {
    let (_dir, model) = city();
    let mut planner = PathMemoizer::new();
    let first = planner
        .get_or_compute_by_id(&model.graph, model.traffic(), "1", "4", TimePeriod::Morning)
        .unwrap();
    let second = planner
        .get_or_compute_by_id(&model.graph, model.traffic(), "1", "4", TimePeriod::Morning)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(planner.computations(), 1);
    assert_eq!(planner.hits(), 1);
}

#[test]
fn planning_algorithms_run_on_loaded_data() {
    let (_dir, model) = city();

    let forest = population_weighted_mst(&model.graph, &model.context, MstWeights::default());
    assert_eq!(forest.len(), model.graph.node_count() - 1);

    let plan = budget_constrained_mst(&model.graph, &model.context, 1000.0);
    assert!(plan.total_cost <= 1000.0);

    let repairs = allocate_maintenance(&model.dataset.existing_roads, &model.context, 50.0);
    assert!(repairs.used_budget <= 50.0);

    let schedule = optimize_schedule(&model.dataset.metro_lines, &model.dataset.bus_routes);
    assert_eq!(schedule.metro.len(), 1);
    assert_eq!(schedule.bus["B1"].len(), TimePeriod::ALL.len());

    let interchanges = recommend_interchanges(&model.graph, &model.dataset.demand, 1000.0, 10);
    assert!(interchanges.is_empty());
}
