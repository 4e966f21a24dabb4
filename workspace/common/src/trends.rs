use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::PopulationGroup;

/// Mean WLA value for one (month, population group) bucket.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TrendPoint {
    /// First day of the month
    pub month: NaiveDate,
    pub population_group: PopulationGroup,
    /// Arithmetic mean of the bucket's records
    pub value: f64,
}

impl TrendPoint {
    pub fn new(month: NaiveDate, population_group: PopulationGroup, value: f64) -> Self {
        Self {
            month,
            population_group,
            value,
        }
    }
}

/// Aggregated historical series for a state selection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TrendSeries {
    /// States the series was computed for; empty means all states
    pub states: Vec<String>,
    /// Population groups present in `points`, canonical order
    pub groups: Vec<PopulationGroup>,
    /// Points ordered by month, then population group
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    pub fn new(states: Vec<String>, points: Vec<TrendPoint>) -> Self {
        let mut groups: Vec<PopulationGroup> = points.iter().map(|p| p.population_group).collect();
        groups.sort();
        groups.dedup();

        Self {
            states,
            groups,
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points of a single population group.
    pub fn for_group(&self, group: PopulationGroup) -> impl Iterator<Item = &TrendPoint> {
        self.points.iter().filter(move |p| p.population_group == group)
    }
}
