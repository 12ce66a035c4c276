//! Road maintenance budgeting as a 0/1 knapsack.
//!
//! Money is discretized in 0.1-unit steps so the table stays small and
//! exact: a budget of 1000 (million) is 10 000 levels.

use log::{info, warn};
use serde::Serialize;

use crate::loading::ExistingRoadRecord;
use crate::model::PlanningContext;

/// Knapsack levels per currency unit.
const UNITS_PER_CURRENCY: f64 = 10.0;
/// Condition a maintained road is brought back to.
const TARGET_CONDITION: f64 = 9.0;
/// Population that scales a road's benefit by one.
const POPULATION_SCALE: f64 = 100_000.0;

/// A road considered for maintenance, with its derived cost and benefit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceCandidate {
    pub road_id: String,
    pub from_id: String,
    pub to_id: String,
    pub distance_km: f64,
    pub current_condition: f64,
    /// Informational ranking only, selection is by the knapsack
    pub maintenance_priority: f64,
    pub maintenance_cost: f64,
    pub benefit: f64,
    pub affected_population: f64,
    pub population_adjusted_benefit: f64,
}

impl MaintenanceCandidate {
    pub fn from_record(record: &ExistingRoadRecord, context: &PlanningContext) -> Self {
        let distance_km = record.distance_km;
        let condition = record.condition;
        let benefit = (TARGET_CONDITION - condition).max(0.0) * distance_km;
        let affected_population =
            context.population(&record.from_id) + context.population(&record.to_id);
        Self {
            road_id: record.road_id(),
            from_id: record.from_id.clone(),
            to_id: record.to_id.clone(),
            distance_km,
            current_condition: condition,
            maintenance_priority: (10.0 - condition) * distance_km,
            maintenance_cost: distance_km * (11.0 - condition) / 10.0,
            benefit,
            affected_population,
            population_adjusted_benefit: benefit * affected_population / POPULATION_SCALE,
        }
    }

    /// Cost in knapsack levels, `None` for roads that cost nothing.
    fn cost_units(&self) -> Option<usize> {
        let units = (self.maintenance_cost * UNITS_PER_CURRENCY).round();
        if !units.is_finite() || units <= 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let units = units as usize;
        Some(units)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenancePlan {
    pub total_budget: f64,
    pub used_budget: f64,
    pub total_benefit: f64,
    pub roads_to_maintain: Vec<MaintenanceCandidate>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnapsackItem {
    pub cost_units: usize,
    pub benefit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KnapsackSolution {
    /// Lowest budget level reaching the best benefit
    pub used_units: usize,
    pub total_benefit: f64,
    /// Indices into the item slice, in selection order
    pub selected: Vec<usize>,
}

/// Classic 0/1 knapsack over integer budget levels.
///
/// Levels are scanned downwards per item so each item is used at most once.
/// A level only changes on a strict improvement, and the answer is the
/// first level holding the maximum benefit. The table never grows past the
/// combined cost of all items, whatever the budget.
pub fn solve_knapsack(items: &[KnapsackItem], budget_units: usize) -> KnapsackSolution {
    let total_cost = items
        .iter()
        .fold(0_usize, |sum, item| sum.saturating_add(item.cost_units));
    let budget_units = budget_units.min(total_cost);
    let mut best = vec![0.0_f64; budget_units + 1];
    let mut chosen: Vec<Vec<usize>> = vec![Vec::new(); budget_units + 1];

    for (index, item) in items.iter().enumerate() {
        let cost = item.cost_units;
        if cost == 0 || cost > budget_units {
            continue;
        }
        for level in (cost..=budget_units).rev() {
            let candidate = best[level - cost] + item.benefit;
            if candidate > best[level] {
                best[level] = candidate;
                let mut selection = chosen[level - cost].clone();
                selection.push(index);
                chosen[level] = selection;
            }
        }
    }

    let mut optimum = 0;
    for level in 1..=budget_units {
        if best[level] > best[optimum] {
            optimum = level;
        }
    }

    KnapsackSolution {
        used_units: optimum,
        total_benefit: best[optimum],
        selected: std::mem::take(&mut chosen[optimum]),
    }
}

/// Picks the set of existing roads to repair that maximizes
/// population-weighted benefit within `budget` (million currency units).
pub fn allocate_maintenance(
    roads: &[ExistingRoadRecord],
    context: &PlanningContext,
    budget: f64,
) -> MaintenancePlan {
    let mut candidates: Vec<MaintenanceCandidate> = roads
        .iter()
        .map(|road| MaintenanceCandidate::from_record(road, context))
        .collect();
    candidates.sort_by(|a, b| b.maintenance_priority.total_cmp(&a.maintenance_priority));

    let items: Vec<KnapsackItem> = candidates
        .iter()
        .map(|candidate| KnapsackItem {
            cost_units: candidate.cost_units().unwrap_or(0),
            benefit: candidate.population_adjusted_benefit,
        })
        .collect();
    let skipped = items.iter().filter(|item| item.cost_units == 0).count();
    if skipped > 0 {
        warn!("{skipped} roads have no maintenance cost and were left out");
    }

    let solution = solve_knapsack(&items, budget_units(budget));
    #[allow(clippy::cast_precision_loss)]
    let used_budget = solution.used_units as f64 / UNITS_PER_CURRENCY;
    let roads_to_maintain: Vec<MaintenanceCandidate> = solution
        .selected
        .iter()
        .map(|&index| candidates[index].clone())
        .collect();

    info!(
        "Maintenance plan: {} roads, {used_budget:.1} of {budget:.1} spent, benefit {:.2}",
        roads_to_maintain.len(),
        solution.total_benefit
    );
    MaintenancePlan {
        total_budget: budget,
        used_budget,
        total_benefit: solution.total_benefit,
        roads_to_maintain,
    }
}

fn budget_units(budget: f64) -> usize {
    let units = (budget * UNITS_PER_CURRENCY + 1e-9).floor();
    if units.is_finite() && units > 0.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let units = units as usize;
        units
    } else {
        0
    }
}
