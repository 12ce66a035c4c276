//! Time-of-day buckets and the static traffic flow table

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::QueryError;
use crate::loading::TrafficFlowRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 4] = [
        TimePeriod::Morning,
        TimePeriod::Afternoon,
        TimePeriod::Evening,
        TimePeriod::Night,
    ];

    /// Share of daily public transport demand falling into the period.
    pub fn demand_weight(self) -> f64 {
        match self {
            TimePeriod::Morning => 0.35,
            TimePeriod::Afternoon => 0.25,
            TimePeriod::Evening => 0.30,
            TimePeriod::Night => 0.10,
        }
    }

    /// Buckets a wall-clock time: morning 06-12, afternoon 12-16,
    /// evening 16-21, night otherwise.
    pub fn from_time(time: NaiveTime) -> Self {
        match time.hour() {
            6..=11 => TimePeriod::Morning,
            12..=15 => TimePeriod::Afternoon,
            16..=20 => TimePeriod::Evening,
            _ => TimePeriod::Night,
        }
    }

    /// The bucket of `time` when a clock time was given, `self` otherwise.
    pub fn or_from_time(self, time: Option<NaiveTime>) -> Self {
        time.map_or(self, Self::from_time)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimePeriod::Morning => "morning",
            TimePeriod::Afternoon => "afternoon",
            TimePeriod::Evening => "evening",
            TimePeriod::Night => "night",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimePeriod {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(TimePeriod::Morning),
            "afternoon" => Ok(TimePeriod::Afternoon),
            "evening" => Ok(TimePeriod::Evening),
            "night" => Ok(TimePeriod::Night),
            _ => Err(QueryError::UnknownTimePeriod(s.to_string())),
        }
    }
}

/// Observed vehicle flow (vehicles/hour) per period and directed place pair.
///
/// Lookups that miss mean "flow equals capacity", which the weight model
/// turns into a neutral traffic factor.
#[derive(Debug, Clone, Default)]
pub struct TrafficTable {
    flows: HashMap<String, HashMap<String, [Option<f64>; 4]>>,
}

impl TrafficTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from traffic count rows. Road ids must look like
    /// `From-To`; anything else is skipped. The first row for a pair wins.
    pub fn from_records(records: &[TrafficFlowRecord]) -> Self {
        let mut table = Self::new();
        for record in records {
            let Some((from, to)) = split_road_id(&record.road_id) else {
                log::warn!(
                    "Skipping traffic row with malformed road id '{}'",
                    record.road_id
                );
                continue;
            };
            let slots = table
                .flows
                .entry(from.to_string())
                .or_default()
                .entry(to.to_string())
                .or_insert([None; 4]);
            for (period, flow) in [
                (TimePeriod::Morning, record.morning),
                (TimePeriod::Afternoon, record.afternoon),
                (TimePeriod::Evening, record.evening),
                (TimePeriod::Night, record.night),
            ] {
                let slot = &mut slots[period.slot()];
                if slot.is_none() {
                    *slot = Some(flow);
                }
            }
        }
        table
    }

    /// Sets (or overrides) the flow observed on `from -> to` during `period`.
    pub fn set_flow(&mut self, period: TimePeriod, from: &str, to: &str, flow: f64) {
        self.flows
            .entry(from.to_string())
            .or_default()
            .entry(to.to_string())
            .or_insert([None; 4])[period.slot()] = Some(flow);
    }

    pub fn flow(&self, period: TimePeriod, from: &str, to: &str) -> Option<f64> {
        self.flows.get(from)?.get(to)?[period.slot()]
    }

    /// Number of directed pairs with at least one observation.
    pub fn len(&self) -> usize {
        self.flows.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn split_road_id(road_id: &str) -> Option<(&str, &str)> {
    let mut parts = road_id.trim().split('-');
    let from = parts.next()?.trim().trim_matches('"');
    let to = parts.next()?.trim().trim_matches('"');
    if parts.next().is_some() || from.is_empty() || to.is_empty() {
        return None;
    }
    Some((from, to))
}
