//! HTTP endpoints. Handlers validate the request, then run the engine on the
//! blocking pool through [`AppState::run`].

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveTime;
use geojson::{Feature, FeatureCollection};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use urbanroute_core::algo::{
    BusRouteReview, DelayEstimate, Interchange, MaintenancePlan, MstWeights, SpanningForest,
    TransitSchedule, allocate_maintenance, analyze_bus_routes, budget_constrained_mst,
    connectivity_mst, emergency_delay, optimize_schedule, population_weighted_mst,
    recommend_interchanges,
};
use urbanroute_core::model::{BuildReport, FacilityKind, NetworkGraph, PlaceKind};
use urbanroute_core::routing::{
    CachePolicy, ModeComparison, PathMemoizer, RoutePath, RouteQuery, compare_modes,
    emergency_route, mixed_mode_route, shortest_path,
};
use urbanroute_core::{TimePeriod, TransportMode};

use crate::config::ServerConfig;
use crate::error::{ApiError, handle_middleware_error};
use crate::state::AppState;

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .load_shed()
        .concurrency_limit(config.max_concurrent_requests.max(1))
        .timeout(Duration::from_secs(config.request_timeout_secs));

    Router::new()
        .route("/health", get(health))
        .route("/places", get(places))
        .route("/route", post(route))
        .route("/route/emergency", post(emergency))
        .route("/route/mixed", post(mixed))
        .route("/route/compare", post(compare))
        .route("/routes/batch", post(batch))
        .route("/mst/population", post(mst_population))
        .route("/mst/budget", post(mst_budget))
        .route("/mst/connectivity", post(mst_connectivity))
        .route("/maintenance", post(maintenance))
        .route("/schedule", get(schedule))
        .route("/interchanges", get(interchanges))
        .route("/bus-routes", get(bus_routes))
        .layer(middleware)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn default_period() -> TimePeriod {
    TimePeriod::Morning
}

fn check_amount(name: &str, value: f64) -> Result<f64, ApiError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ApiError::BadRequest(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    summary: String,
    report: BuildReport,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        summary: state.model.summary(),
        report: state.model.graph.report.clone(),
    })
}

#[derive(Deserialize)]
struct PlacesParams {
    mode: Option<TransportMode>,
}

#[derive(Serialize)]
struct PlaceView {
    id: String,
    name: String,
    kind: PlaceKind,
    x: f64,
    y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    population: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    facility: Option<FacilityKind>,
}

async fn places(
    State(state): State<AppState>,
    Query(params): Query<PlacesParams>,
) -> Json<Vec<PlaceView>> {
    let graph = &state.model.graph;
    let nodes = match params.mode {
        Some(mode) => graph.eligible_places(mode),
        None => graph.places().map(|(node, _)| node).collect(),
    };
    let views = nodes
        .into_iter()
        .map(|node| {
            let place = graph.place(node);
            PlaceView {
                id: place.id.clone(),
                name: place.name.clone(),
                kind: place.kind,
                x: place.geometry.x(),
                y: place.geometry.y(),
                population: place.population,
                facility: place.facility,
            }
        })
        .collect();
    Json(views)
}

#[derive(Debug, Serialize)]
struct RouteResponse {
    reachable: bool,
    path: RoutePath,
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<Feature>,
}

impl RouteResponse {
    fn new(graph: &NetworkGraph, path: RoutePath) -> Result<Self, ApiError> {
        let geometry = if path.is_empty() {
            None
        } else {
            Some(path.to_geojson(graph)?)
        };
        Ok(Self {
            reachable: !path.is_empty(),
            path,
            geometry,
        })
    }
}

async fn route(
    State(state): State<AppState>,
    Json(query): Json<RouteQuery>,
) -> Result<Json<RouteResponse>, ApiError> {
    state
        .run(move |model, _| {
            let path = shortest_path(&model.graph, model.traffic(), &query)?;
            RouteResponse::new(&model.graph, path)
        })
        .await
        .map(Json)
}

#[derive(Deserialize)]
struct Endpoints {
    from: String,
    to: String,
}

#[derive(Deserialize)]
struct TripRequest {
    from: String,
    to: String,
    #[serde(default = "default_period")]
    period: TimePeriod,
    time: Option<NaiveTime>,
}

#[derive(Deserialize)]
struct EmergencyRequest {
    from: String,
    to: String,
    #[serde(default = "default_period")]
    period: TimePeriod,
    time: Option<NaiveTime>,
    /// Car trip whose delay should be estimated
    regular: Option<Endpoints>,
}

#[derive(Serialize)]
struct EmergencyResponse {
    #[serde(flatten)]
    route: RouteResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    delay: Option<DelayEstimate>,
}

async fn emergency(
    State(state): State<AppState>,
    Json(request): Json<EmergencyRequest>,
) -> Result<Json<EmergencyResponse>, ApiError> {
    state
        .run(move |model, planning| {
            let (graph, traffic) = (&model.graph, model.traffic());
            let period = request.period.or_from_time(request.time);
            let path = emergency_route(graph, traffic, &request.from, &request.to, period)?;
            let delay = match request.regular {
                Some(trip) => {
                    let query = RouteQuery::new(&trip.from, &trip.to, TransportMode::Car, period);
                    let regular = shortest_path(graph, traffic, &query)?;
                    Some(emergency_delay(graph, &regular, &path, planning.delay))
                }
                None => None,
            };
            Ok(EmergencyResponse {
                route: RouteResponse::new(graph, path)?,
                delay,
            })
        })
        .await
        .map(Json)
}

async fn mixed(
    State(state): State<AppState>,
    Json(request): Json<TripRequest>,
) -> Result<Json<RouteResponse>, ApiError> {
    state
        .run(move |model, _| {
            let path = mixed_mode_route(
                &model.graph,
                model.traffic(),
                &request.from,
                &request.to,
                request.period.or_from_time(request.time),
            )?;
            RouteResponse::new(&model.graph, path)
        })
        .await
        .map(Json)
}

#[derive(Serialize)]
struct CompareResponse {
    fastest: Option<&'static str>,
    #[serde(flatten)]
    comparison: ModeComparison,
}

async fn compare(
    State(state): State<AppState>,
    Json(request): Json<TripRequest>,
) -> Result<Json<CompareResponse>, ApiError> {
    state
        .run(move |model, _| {
            let comparison = compare_modes(
                &model.graph,
                model.traffic(),
                &request.from,
                &request.to,
                request.period.or_from_time(request.time),
            )?;
            Ok(CompareResponse {
                fastest: comparison.fastest().map(|(mode, _)| mode),
                comparison,
            })
        })
        .await
        .map(Json)
}

#[derive(Deserialize)]
struct BatchRequest {
    #[serde(default = "default_period")]
    period: TimePeriod,
    time: Option<NaiveTime>,
    trips: Vec<Endpoints>,
    cache: Option<CachePolicy>,
}

#[derive(Serialize)]
struct BatchItem {
    from: String,
    to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<RoutePath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct BatchResponse {
    results: Vec<BatchItem>,
    computations: usize,
    cache_hits: usize,
}

/// Car paths for many trips sharing one memoizer, so repeated pairs are
/// searched once. A rejected trip does not fail the batch.
async fn batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    state
        .run(move |model, planning| {
            let policy = request.cache.unwrap_or(planning.batch_cache);
            let period = request.period.or_from_time(request.time);
            let mut planner = PathMemoizer::with_policy(policy);
            let results = request
                .trips
                .into_iter()
                .map(|trip| {
                    let outcome = planner.get_or_compute_by_id(
                        &model.graph,
                        model.traffic(),
                        &trip.from,
                        &trip.to,
                        period,
                    );
                    let (path, error) = match outcome {
                        Ok(path) => (Some(path), None),
                        Err(e) => (None, Some(e.to_string())),
                    };
                    BatchItem {
                        from: trip.from,
                        to: trip.to,
                        path,
                        error,
                    }
                })
                .collect();
            Ok(BatchResponse {
                results,
                computations: planner.computations(),
                cache_hits: planner.hits(),
            })
        })
        .await
        .map(Json)
}

#[derive(Serialize)]
struct ForestResponse {
    #[serde(flatten)]
    forest: SpanningForest,
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<FeatureCollection>,
}

impl ForestResponse {
    fn new(graph: &NetworkGraph, forest: SpanningForest, geojson: bool) -> Result<Self, ApiError> {
        let geometry = if geojson {
            Some(forest.to_geojson(graph)?)
        } else {
            None
        };
        Ok(Self { forest, geometry })
    }
}

#[derive(Deserialize)]
struct PopulationMstRequest {
    alpha: Option<f64>,
    beta: Option<f64>,
    #[serde(default)]
    geojson: bool,
}

async fn mst_population(
    State(state): State<AppState>,
    Json(request): Json<PopulationMstRequest>,
) -> Result<Json<ForestResponse>, ApiError> {
    let defaults = state.planning.mst;
    let weights = MstWeights {
        alpha: check_amount("alpha", request.alpha.unwrap_or(defaults.alpha))?,
        beta: check_amount("beta", request.beta.unwrap_or(defaults.beta))?,
    };
    state
        .run(move |model, _| {
            let forest = population_weighted_mst(&model.graph, &model.context, weights);
            ForestResponse::new(&model.graph, forest, request.geojson)
        })
        .await
        .map(Json)
}

#[derive(Deserialize)]
struct BudgetRequest {
    budget: Option<f64>,
    #[serde(default)]
    geojson: bool,
}

async fn mst_budget(
    State(state): State<AppState>,
    Json(request): Json<BudgetRequest>,
) -> Result<Json<ForestResponse>, ApiError> {
    let budget = check_amount(
        "budget",
        request.budget.unwrap_or(state.planning.construction_budget),
    )?;
    state
        .run(move |model, _| {
            let forest = budget_constrained_mst(&model.graph, &model.context, budget);
            ForestResponse::new(&model.graph, forest, request.geojson)
        })
        .await
        .map(Json)
}

async fn mst_connectivity(
    State(state): State<AppState>,
    Json(request): Json<BudgetRequest>,
) -> Result<Json<ForestResponse>, ApiError> {
    let budget = check_amount(
        "budget",
        request.budget.unwrap_or(state.planning.construction_budget),
    )?;
    state
        .run(move |model, _| {
            let forest = connectivity_mst(&model.graph, &model.context, budget);
            ForestResponse::new(&model.graph, forest, request.geojson)
        })
        .await
        .map(Json)
}

#[derive(Deserialize)]
struct MaintenanceRequest {
    budget: Option<f64>,
}

async fn maintenance(
    State(state): State<AppState>,
    Json(request): Json<MaintenanceRequest>,
) -> Result<Json<MaintenancePlan>, ApiError> {
    let budget = check_amount(
        "budget",
        request.budget.unwrap_or(state.planning.maintenance_budget),
    )?;
    state
        .run(move |model, _| {
            Ok(allocate_maintenance(
                &model.dataset.existing_roads,
                &model.context,
                budget,
            ))
        })
        .await
        .map(Json)
}

async fn schedule(State(state): State<AppState>) -> Result<Json<TransitSchedule>, ApiError> {
    state
        .run(|model, _| {
            Ok(optimize_schedule(
                &model.dataset.metro_lines,
                &model.dataset.bus_routes,
            ))
        })
        .await
        .map(Json)
}

#[derive(Deserialize)]
struct InterchangeParams {
    max_distance: Option<f64>,
    limit: Option<usize>,
}

async fn interchanges(
    State(state): State<AppState>,
    Query(params): Query<InterchangeParams>,
) -> Result<Json<Vec<Interchange>>, ApiError> {
    let max_distance = check_amount(
        "max_distance",
        params
            .max_distance
            .unwrap_or(state.planning.interchange_max_distance),
    )?;
    let limit = params.limit.unwrap_or(state.planning.interchange_limit);
    state
        .run(move |model, _| {
            Ok(recommend_interchanges(
                &model.graph,
                &model.dataset.demand,
                max_distance,
                limit,
            ))
        })
        .await
        .map(Json)
}

/// Length, served demand and nearby unserved demand of every bus route.
async fn bus_routes(
    State(state): State<AppState>,
) -> Result<Json<Vec<BusRouteReview>>, ApiError> {
    state
        .run(|model, _| {
            Ok(analyze_bus_routes(
                &model.graph,
                &model.dataset.bus_routes,
                &model.dataset.demand,
            ))
        })
        .await
        .map(Json)
}
