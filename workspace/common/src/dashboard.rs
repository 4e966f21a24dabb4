use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{ComparativeForecast, GroupForecast, PopulationGroup, TrendSeries};

/// Highest aggregated value in the selection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PeakValue {
    pub value: f64,
    pub month: NaiveDate,
    pub population_group: PopulationGroup,
}

/// Value predicted for the furthest forecast month.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LatestForecast {
    pub value: f64,
    pub month: NaiveDate,
    pub population_group: PopulationGroup,
}

/// Summary metrics shown above the charts.
///
/// Every field is optional: an empty selection has no mean and no peak, and
/// the latest forecast is missing whenever the forecast could not be fitted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct KpiSummary {
    pub overall_average: Option<f64>,
    pub peak: Option<PeakValue>,
    pub latest_forecast: Option<LatestForecast>,
}

/// Outcome of the individual forecast for the selected group.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastSection {
    Ready {
        forecast: GroupForecast,
    },
    /// The forecast was skipped; the historical view is still valid.
    Unavailable {
        population_group: Option<PopulationGroup>,
        reason: String,
    },
}

impl ForecastSection {
    pub fn forecast(&self) -> Option<&GroupForecast> {
        match self {
            ForecastSection::Ready { forecast } => Some(forecast),
            ForecastSection::Unavailable { .. } => None,
        }
    }
}

/// Everything a dashboard render needs for one (states, horizon, group) selection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DashboardView {
    pub horizon: u32,
    pub trends: TrendSeries,
    pub kpis: KpiSummary,
    pub forecast: ForecastSection,
    pub comparative: ComparativeForecast,
}
