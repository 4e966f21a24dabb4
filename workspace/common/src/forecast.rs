use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::PopulationGroup;

/// One row of a fitted/forecast series.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ForecastPoint {
    pub month: NaiveDate,
    pub predicted: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// True for months after the last historical month
    pub is_future: bool,
}

/// Forecast for a single population group.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GroupForecast {
    pub population_group: PopulationGroup,
    /// Name of the model that produced the forecast
    pub model: String,
    /// Number of future months
    pub horizon: u32,
    pub last_historical_month: NaiveDate,
    /// In-sample fit followed by `horizon` future months
    pub points: Vec<ForecastPoint>,
}

impl GroupForecast {
    pub fn future_points(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(|p| p.is_future)
    }

    /// Last point of the forecast, i.e. the furthest future month.
    pub fn latest(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }
}

/// A group left out of the comparative forecast.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SkippedGroup {
    pub population_group: PopulationGroup,
    pub reason: String,
}

/// Forecasts for every population group aligned on a shared month axis.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct ComparativeForecast {
    /// Sorted union of the months covered by `series`
    pub months: Vec<NaiveDate>,
    pub series: Vec<GroupForecast>,
    pub skipped: Vec<SkippedGroup>,
}

impl ComparativeForecast {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
