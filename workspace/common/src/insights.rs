use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::PopulationGroup;

/// Single highest record of the dataset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PeakRecord {
    pub value: f64,
    pub state: String,
    pub population_group: PopulationGroup,
    pub month: NaiveDate,
}

/// Distribution of values for one population group.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GroupStatistics {
    pub population_group: PopulationGroup,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; absent for a single record
    pub std_dev: Option<f64>,
}

/// Mean value and record count for one state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StateStatistics {
    pub state: String,
    pub mean: f64,
    pub record_count: u32,
}

/// Growth of a state between its first and last record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StateGrowth {
    pub state: String,
    /// Percent change
    pub growth: f64,
}

/// Historical performance analysis over the whole selection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct HistoricalInsights {
    pub first_month: NaiveDate,
    pub last_month: NaiveDate,
    pub total_records: u32,
    pub overall_average: f64,
    pub peak: PeakRecord,
    /// Sorted by mean, highest first
    pub groups: Vec<GroupStatistics>,
    pub top_states: Vec<StateStatistics>,
    pub bottom_states: Vec<StateStatistics>,
    /// Percent change of the first month's mean to the last month's mean
    pub overall_growth: f64,
    pub most_improved_state: Option<StateGrowth>,
}
