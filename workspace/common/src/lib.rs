//! Common transport-layer types shared between the API and its clients.
//! These structs mirror the handlers' response payloads so a dashboard
//! front end can deserialize API responses without duplicating shapes.

mod dashboard;
mod forecast;
mod insights;
mod population;
mod trends;

pub use dashboard::{DashboardView, ForecastSection, KpiSummary, LatestForecast, PeakValue};
pub use forecast::{ComparativeForecast, ForecastPoint, GroupForecast, SkippedGroup};
pub use insights::{GroupStatistics, HistoricalInsights, PeakRecord, StateGrowth, StateStatistics};
pub use population::{PopulationGroup, UnknownPopulationGroup};
pub use trends::{TrendPoint, TrendSeries};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Client-side view of the backend's response envelope.
///
/// Field names match `ApiResponse` in the server crate, so clients (and the
/// server's integration tests) deserialize responses with this type.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}
