//! Per-period fleet sizing for metro lines and bus routes.
//!
//! Every (line, period) pair is sized independently by enumerating the
//! feasible vehicle counts and keeping the one with the best service
//! quality.

use std::collections::BTreeMap;

use log::info;
use rayon::prelude::*;
use serde::Serialize;

use crate::loading::{BusRouteRecord, MetroLineRecord};
use crate::model::TimePeriod;

pub const MAX_TRAINS_PER_HOUR: u32 = 20;
pub const TRAIN_CAPACITY: f64 = 1000.0;
pub const MAX_BUSES_PER_HOUR: u32 = 30;
pub const BUS_CAPACITY: f64 = 80.0;
/// Quality lost per passenger left on the platform.
const UNMET_DEMAND_PENALTY: f64 = 0.5;

/// Service plan of one line during one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodService {
    pub vehicles_per_hour: u32,
    pub headway_minutes: f64,
    pub capacity: f64,
    pub expected_demand: f64,
}

/// Line or route id to its plan for each period.
pub type LineSchedule = BTreeMap<String, BTreeMap<TimePeriod, PeriodService>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransitSchedule {
    pub metro: LineSchedule,
    pub bus: LineSchedule,
}

/// Passengers served per minute of headway, minus a penalty for demand
/// the offered capacity cannot carry.
pub fn service_quality(vehicles: u32, vehicle_capacity: f64, demand: f64) -> f64 {
    let vehicles = f64::from(vehicles);
    let capacity = vehicles * vehicle_capacity;
    let headway = 60.0 / vehicles;
    if capacity >= demand {
        demand / headway
    } else {
        capacity / headway - (demand - capacity) * UNMET_DEMAND_PENALTY
    }
}

/// Best vehicle count in `1..=max` for `quality`; the first maximum wins.
fn best_count(max: u32, quality: impl Fn(u32) -> f64) -> u32 {
    let mut best = 1;
    let mut best_quality = quality(1);
    for vehicles in 2..=max {
        let candidate = quality(vehicles);
        if candidate > best_quality {
            best = vehicles;
            best_quality = candidate;
        }
    }
    best
}

fn service(vehicles: u32, vehicle_capacity: f64, demand: f64) -> PeriodService {
    PeriodService {
        vehicles_per_hour: vehicles,
        headway_minutes: 60.0 / f64::from(vehicles),
        capacity: f64::from(vehicles) * vehicle_capacity,
        expected_demand: demand,
    }
}

pub fn metro_periods(daily_passengers: f64) -> BTreeMap<TimePeriod, PeriodService> {
    TimePeriod::ALL
        .into_iter()
        .map(|period| {
            let demand = daily_passengers * period.demand_weight();
            let trains = best_count(MAX_TRAINS_PER_HOUR, |trains| {
                service_quality(trains, TRAIN_CAPACITY, demand)
            });
            (period, service(trains, TRAIN_CAPACITY, demand))
        })
        .collect()
}

/// Bus variant: growing the fleet beyond what the route has today divides
/// quality by the growth ratio.
pub fn bus_periods(daily_passengers: f64, buses_assigned: u32) -> BTreeMap<TimePeriod, PeriodService> {
    let current = f64::from(buses_assigned.max(1));
    TimePeriod::ALL
        .into_iter()
        .map(|period| {
            let demand = daily_passengers * period.demand_weight();
            let buses = best_count(MAX_BUSES_PER_HOUR, |buses| {
                let quality = service_quality(buses, BUS_CAPACITY, demand);
                let requested = f64::from(buses);
                if requested > current {
                    quality / (requested / current)
                } else {
                    quality
                }
            });
            (period, service(buses, BUS_CAPACITY, demand))
        })
        .collect()
}

/// Sizes every metro line and bus route for each period.
pub fn optimize_schedule(
    metro_lines: &[MetroLineRecord],
    bus_routes: &[BusRouteRecord],
) -> TransitSchedule {
    let metro: LineSchedule = metro_lines
        .par_iter()
        .map(|line| (line.line_id.clone(), metro_periods(line.daily_passengers)))
        .collect();
    let bus: LineSchedule = bus_routes
        .par_iter()
        .map(|route| {
            (
                route.route_id.clone(),
                bus_periods(route.daily_passengers, route.buses_assigned),
            )
        })
        .collect();

    info!(
        "Scheduled {} metro lines and {} bus routes",
        metro.len(),
        bus.len()
    );
    TransitSchedule { metro, bus }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_penalizes_unmet_demand() {
        assert!((service_quality(10, 100.0, 600.0) - 100.0).abs() < 1e-9);
        // 5 vehicles carry 500 of 600: 500 / 12 - 50
        let short = service_quality(5, 100.0, 600.0);
        assert!((short - (500.0 / 12.0 - 50.0)).abs() < 1e-9);
    }

    #[test]
    fn busy_metro_line_runs_at_full_frequency() {
        let periods = metro_periods(150_000.0);
        let morning = periods[&TimePeriod::Morning];
        assert_eq!(morning.vehicles_per_hour, MAX_TRAINS_PER_HOUR);
        assert!((morning.expected_demand - 52_500.0).abs() < 1e-6);
        assert!((morning.capacity - 20_000.0).abs() < 1e-9);
        assert!((morning.headway_minutes - 3.0).abs() < 1e-9);
    }

    #[test]
    fn bus_fleet_within_current_size_is_not_penalized() {
        let periods = bus_periods(30_000.0, 30);
        for service in periods.values() {
            assert_eq!(service.vehicles_per_hour, MAX_BUSES_PER_HOUR);
        }
    }

    #[test]
    fn every_period_is_planned_within_bounds() {
        let metro = vec![MetroLineRecord {
            line_id: "M1".to_string(),
            stations: "1,2,3".to_string(),
            daily_passengers: 40_000.0,
        }];
        let bus = vec![
            BusRouteRecord {
                route_id: "B1".to_string(),
                stops: "1,2".to_string(),
                buses_assigned: 8,
                daily_passengers: 12_000.0,
            },
            BusRouteRecord {
                route_id: "B2".to_string(),
                stops: "2,3".to_string(),
                buses_assigned: 0,
                daily_passengers: 500.0,
            },
        ];
        let schedule = optimize_schedule(&metro, &bus);
        assert_eq!(schedule.metro.len(), 1);
        assert_eq!(schedule.bus.len(), 2);
        for (id, periods) in &schedule.bus {
            assert_eq!(periods.len(), 4, "{id}");
            for (period, service) in periods {
                assert!((1..=MAX_BUSES_PER_HOUR).contains(&service.vehicles_per_hour));
                let vehicles = f64::from(service.vehicles_per_hour);
                assert!((service.headway_minutes * vehicles - 60.0).abs() < 1e-9);
                assert!((service.capacity - vehicles * BUS_CAPACITY).abs() < 1e-9);
                let daily = if id == "B1" { 12_000.0 } else { 500.0 };
                assert!((service.expected_demand - daily * period.demand_weight()).abs() < 1e-9);
            }
        }
    }
}
